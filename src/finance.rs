//! Costs and investment appraisal for generation technologies.
use crate::model::{EconomicParameters, Model, UnknownTechnologyPolicy};
use crate::technology::{Technology, TechnologyMap, TechnologySpec};
use crate::units::{Capacity, Dimensionless, Energy, Money, MoneyPerEnergy};
use anyhow::{Result, bail, ensure};
use serde::Serialize;

/// The number of kWh in one MWh
const KWH_PER_MWH: f64 = 1000.0;

/// Convergence tolerance for the IRR root-find
const IRR_TOLERANCE: f64 = 1.48e-8;

/// Maximum number of Newton iterations for the IRR root-find
const IRR_MAX_ITERATIONS: u32 = 50;

/// Initial guess for the IRR root-find
const IRR_INITIAL_GUESS: f64 = 0.1;

/// The sum of discount factors for years 1 to `lifetime`.
///
/// Multiplying a constant annual value by this gives its present value.
pub fn present_value_factor(lifetime: u32, discount_rate: Dimensionless) -> Dimensionless {
    let base = 1.0 + discount_rate.value();
    Dimensionless((1..=lifetime).map(|t| base.powi(-(t as i32))).sum())
}

/// The net present value of a series of annual cash flows.
///
/// The first cash flow is undiscounted; the one at index `i` is discounted by `(1 + r)^i`.
pub fn npv(cash_flows: &[Money], discount_rate: Dimensionless) -> Money {
    let base = 1.0 + discount_rate.value();
    cash_flows
        .iter()
        .enumerate()
        .map(|(i, cash_flow)| *cash_flow * Dimensionless(base.powi(-(i as i32))))
        .sum()
}

/// The internal rate of return of a series of annual cash flows.
///
/// Found with Newton's method starting from 10%. Returns `None` if the method does not converge,
/// which is normal for some shapes of cash flow.
pub fn irr(cash_flows: &[Money]) -> Option<Dimensionless> {
    let mut rate = IRR_INITIAL_GUESS;
    for _ in 0..IRR_MAX_ITERATIONS {
        let base = 1.0 + rate;
        let (value, derivative) = cash_flows.iter().enumerate().fold(
            (0.0, 0.0),
            |(value, derivative), (i, cash_flow)| {
                let i = i as i32;
                (
                    value + cash_flow.value() * base.powi(-i),
                    derivative - f64::from(i) * cash_flow.value() * base.powi(-i - 1),
                )
            },
        );

        if derivative == 0.0 || !derivative.is_finite() {
            return None;
        }

        let next = rate - value / derivative;
        if !next.is_finite() || next <= -1.0 {
            return None;
        }
        if (next - rate).abs() < IRR_TOLERANCE {
            return Some(Dimensionless(next));
        }
        rate = next;
    }

    None
}

/// The number of years until cumulative cash flow covers the initial investment.
///
/// Years are counted from 1. Returns `None` if the investment is never recovered within the
/// cash flows given.
pub fn payback_period(investment: Money, annual_cash_flows: &[Money]) -> Option<u32> {
    let mut cumulative = Money(0.0);
    for (year, cash_flow) in (1..).zip(annual_cash_flows) {
        cumulative += *cash_flow;
        if cumulative >= investment {
            return Some(year);
        }
    }

    None
}

/// Costs and appraisal metrics for an investment in one technology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentRecord {
    /// Up-front capital cost
    pub capex: Money,
    /// Operating cost in the first year
    pub annual_opex: Money,
    /// Levelised cost of electricity
    pub lcoe: MoneyPerEnergy,
    /// Net present value of the investment
    pub npv: Money,
    /// Internal rate of return, if defined
    pub irr: Option<Dimensionless>,
    /// Years to recover the capital cost, if it is recovered within the lifetime
    pub payback_period: Option<u32>,
    /// Revenue from selling the annual generation
    pub annual_revenue: Money,
    /// Revenue less operating cost
    pub annual_cash_flow: Money,
}

impl InvestmentRecord {
    /// A record for a technology with no costs
    fn zero() -> Self {
        Self {
            capex: Money(0.0),
            annual_opex: Money(0.0),
            lcoe: MoneyPerEnergy(0.0),
            npv: Money(0.0),
            irr: None,
            payback_period: None,
            annual_revenue: Money(0.0),
            annual_cash_flow: Money(0.0),
        }
    }
}

/// Calculates costs for technologies using a model's technology table and economic assumptions
pub struct CostCalculator<'a> {
    technologies: &'a TechnologyMap,
    economics: &'a EconomicParameters,
    policy: UnknownTechnologyPolicy,
}

impl<'a> CostCalculator<'a> {
    /// Create a calculator for the given model
    pub fn new(model: &'a Model) -> Self {
        Self {
            technologies: &model.technologies,
            economics: &model.parameters.economics,
            policy: model.parameters.unknown_technology_policy,
        }
    }

    /// Look up a technology's parameters, applying the unknown technology policy
    fn lookup(&self, technology: Technology) -> Result<Option<&'a TechnologySpec>> {
        match self.technologies.get(&technology) {
            Some(spec) => Ok(Some(spec)),
            None => match self.policy {
                UnknownTechnologyPolicy::Zero => Ok(None),
                UnknownTechnologyPolicy::Error => {
                    bail!("No cost data for technology {technology}")
                }
            },
        }
    }

    /// The learning-curve multiplier for a technology's capital cost in a year
    pub fn learning_factor(&self, technology: Technology, year: u32) -> Dimensionless {
        if !technology.has_learning_curve() {
            return Dimensionless(1.0);
        }

        let periods =
            (f64::from(year) - f64::from(self.economics.learning_reference_year)) / 2.0;
        (Dimensionless(1.0) - self.economics.learning_rate).powf(periods)
    }

    /// The compound inflation multiplier for a year, relative to the base year
    pub fn inflation_factor(&self, year: u32) -> Dimensionless {
        compound(self.economics.inflation_rate, year, self.economics.base_year)
    }

    /// Capital cost of building `capacity` of a technology in a year.
    ///
    /// Technologies with a learning curve get cheaper over time; all costs are then inflated from
    /// the base year.
    pub fn calculate_capex(
        &self,
        technology: Technology,
        capacity: Capacity,
        year: u32,
    ) -> Result<Money> {
        let Some(spec) = self.lookup(technology)? else {
            return Ok(Money(0.0));
        };

        Ok(spec.capex_per_mw()
            * capacity
            * self.learning_factor(technology, year)
            * self.inflation_factor(year))
    }

    /// Annual operating cost of `capacity` of a technology in a year
    pub fn calculate_opex(
        &self,
        technology: Technology,
        capacity: Capacity,
        year: u32,
    ) -> Result<Money> {
        let Some(spec) = self.lookup(technology)? else {
            return Ok(Money(0.0));
        };

        let capex = self.calculate_capex(technology, capacity, year)?;
        let escalation = compound(self.economics.opex_escalation, year, self.economics.base_year);
        Ok(capex * spec.opex_rate() * escalation)
    }

    /// Levelised cost of electricity over the technology's lifetime.
    ///
    /// It is an error to call this for a technology which generates nothing.
    pub fn calculate_lcoe(
        &self,
        technology: Technology,
        capacity: Capacity,
        annual_generation: Energy,
        year: u32,
    ) -> Result<MoneyPerEnergy> {
        let Some(spec) = self.lookup(technology)? else {
            return Ok(MoneyPerEnergy(0.0));
        };

        let pv_factor = present_value_factor(spec.lifetime, self.economics.discount_rate);
        let pv_generation = annual_generation * pv_factor;
        ensure!(
            pv_generation.value() > 0.0,
            "Cannot calculate LCOE for {technology}: lifetime generation is zero"
        );

        let capex = self.calculate_capex(technology, capacity, year)?;
        let pv_opex = self.calculate_opex(technology, capacity, year)? * pv_factor;
        Ok((capex + pv_opex) / pv_generation)
    }

    /// Fuel cost of generating `generation` with a technology in a year.
    ///
    /// Technologies without a fuel price cost nothing.
    pub fn calculate_fuel_cost(
        &self,
        technology: Technology,
        generation: Energy,
        year: u32,
    ) -> Money {
        let Some(price) = self.economics.fuel_prices.get(&technology) else {
            return Money(0.0);
        };

        MoneyPerEnergy(*price) * generation * self.inflation_factor(year)
    }

    /// Cost of emitting the given tonnes of CO2
    pub fn calculate_carbon_cost(&self, emissions: f64) -> Money {
        Money(emissions * self.economics.carbon_price)
    }

    /// Appraise building `capacity` of a technology in a year.
    ///
    /// Generation is sold at a flat electricity price. The cash flows are the capital cost up
    /// front followed by one year of revenue less operating cost for each year of the lifetime.
    pub fn analyze_investment(
        &self,
        technology: Technology,
        capacity: Capacity,
        annual_generation: Energy,
        year: u32,
    ) -> Result<InvestmentRecord> {
        let Some(spec) = self.lookup(technology)? else {
            return Ok(InvestmentRecord::zero());
        };

        let capex = self.calculate_capex(technology, capacity, year)?;
        let annual_opex = self.calculate_opex(technology, capacity, year)?;
        let lcoe = self.calculate_lcoe(technology, capacity, annual_generation, year)?;
        let annual_revenue =
            Money(annual_generation.value() * KWH_PER_MWH * self.economics.electricity_price);
        let annual_cash_flow = annual_revenue - annual_opex;

        let annual_cash_flows = vec![annual_cash_flow; spec.lifetime as usize];
        let cash_flows: Vec<_> = std::iter::once(Money(0.0) - capex)
            .chain(annual_cash_flows.iter().copied())
            .collect();

        Ok(InvestmentRecord {
            capex,
            annual_opex,
            lcoe,
            npv: npv(&cash_flows, self.economics.discount_rate),
            irr: irr(&cash_flows),
            payback_period: payback_period(capex, &annual_cash_flows),
            annual_revenue,
            annual_cash_flow,
        })
    }
}

/// `(1 + rate)^(year - base_year)`
fn compound(rate: Dimensionless, year: u32, base_year: u32) -> Dimensionless {
    let exponent = i64::from(year) - i64::from(base_year);
    (Dimensionless(1.0) + rate).powi(exponent as i32)
}
