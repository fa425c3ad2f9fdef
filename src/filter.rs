use crate::models::CarDetail;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// 1 kW in metric horsepower
pub const KW_TO_HP: f64 = 1.35962;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").expect("valid year regex"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digits regex"));

/// First four-digit run in `raw`, or 0
pub fn parse_year(raw: &str) -> i32 {
    YEAR_RE
        .find(raw)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// All digits of `raw` read as one integer, or 0
pub fn parse_price(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// "110 kW" -> "150 HP". Strings without digits come back unchanged.
pub fn convert_kw_to_hp(power: &str) -> String {
    let Some(kw) = DIGITS_RE
        .find(power)
        .and_then(|m| m.as_str().parse::<f64>().ok())
    else {
        return power.to_string();
    };

    format!("{} HP", (kw * KW_TO_HP).round() as i64)
}

/// Why a car was dropped, with the offending value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rejection {
    Brand(String),
    Gearbox(String),
    Year(i32),
    Price(i64),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Brand(brand) => write!(f, "Brand: {brand}"),
            Rejection::Gearbox(gearbox) => write!(f, "Gearbox: {gearbox}"),
            Rejection::Year(year) => write!(f, "Year: {year}"),
            Rejection::Price(price) => write!(f, "Price: {price}"),
        }
    }
}

/// Rejection counts for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RejectionTally {
    counts: BTreeMap<Rejection, usize>,
}

impl RejectionTally {
    pub fn record(&mut self, reason: Rejection) {
        *self.counts.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: &Rejection) -> usize {
        self.counts.get(reason).copied().unwrap_or(0)
    }

    /// Number of rejected cars
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct reasons
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rejection, usize)> {
        self.counts.iter().map(|(reason, count)| (reason, *count))
    }
}

impl fmt::Display for RejectionTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(reason, count)| format!("{reason} ({count})"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// What a car must look like to be reported
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    /// Lowercase keywords, any of which must appear in the brand
    pub brand_keywords: Vec<String>,
    /// Lowercase keywords for automatic gearboxes
    pub gearbox_keywords: Vec<String>,
    pub min_year: i32,
    pub max_year: i32,
    /// EUR
    pub min_price: i64,
    pub max_price: i64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            brand_keywords: vec!["vw".to_string(), "volkswagen".to_string()],
            gearbox_keywords: vec![
                "automatski".to_string(),
                "dsg".to_string(),
                "triptronic".to_string(),
                "sekvencijski".to_string(),
            ],
            min_year: 2014,
            max_year: 2016,
            min_price: 10_000,
            max_price: 15_000,
        }
    }
}

fn contains_any(value: &str, keywords: &[String]) -> bool {
    let value = value.to_lowercase();
    keywords.iter().any(|k| value.contains(k.as_str()))
}

/// Result of filtering one batch
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub passed: Vec<CarDetail>,
    pub rejections: RejectionTally,
}

/// Applies the business rules to extracted cars
#[derive(Debug, Clone, Default)]
pub struct CarFilter {
    criteria: FilterCriteria,
}

impl CarFilter {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self { criteria }
    }

    /// Checks run in a fixed order; the first one to fail names the rejection
    pub fn check(&self, car: &CarDetail) -> Result<(), Rejection> {
        let c = &self.criteria;

        if !contains_any(&car.brand, &c.brand_keywords) {
            return Err(Rejection::Brand(car.brand.clone()));
        }

        if !contains_any(&car.gearbox, &c.gearbox_keywords) {
            return Err(Rejection::Gearbox(car.gearbox.clone()));
        }

        let year = parse_year(&car.year);
        if !(c.min_year..=c.max_year).contains(&year) {
            return Err(Rejection::Year(year));
        }

        let price = parse_price(&car.price);
        if !(c.min_price..=c.max_price).contains(&price) {
            return Err(Rejection::Price(price));
        }

        Ok(())
    }

    /// Keep the cars that pass every check, converting their power to HP
    pub fn apply(&self, cars: Vec<CarDetail>) -> FilterOutcome {
        let total = cars.len();
        info!("Applying filters to {} cars...", total);

        let mut outcome = FilterOutcome::default();
        for mut car in cars {
            match self.check(&car) {
                Ok(()) => {
                    car.power = convert_kw_to_hp(&car.power);
                    outcome.passed.push(car);
                }
                Err(reason) => outcome.rejections.record(reason),
            }
        }

        if !outcome.rejections.is_empty() {
            info!(
                "Rejected {}/{} reasons [{}]",
                outcome.rejections.total(),
                total,
                outcome.rejections
            );
        }
        info!("Filters applied: {} cars remaining.", outcome.passed.len());

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(brand: &str, gearbox: &str, year: &str, price: &str) -> CarDetail {
        CarDetail {
            url: format!("https://www.njuskalo.hr/auti/{brand}-{year}-{price}"),
            brand: brand.to_string(),
            gearbox: gearbox.to_string(),
            year: year.to_string(),
            price: price.to_string(),
            power: "110 kW".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parse_year_takes_first_four_digits() {
        assert_eq!(parse_year("Godina: 2015."), 2015);
        assert_eq!(parse_year("2014. godište, model 2015"), 2014);
        assert_eq!(parse_year("N/A"), 0);
        assert_eq!(parse_year("15."), 0);
    }

    #[test]
    fn only_ascii_digits_count() {
        assert_eq!(parse_year("١٢٣٤ / 2015"), 2015);
        assert_eq!(parse_year("١٢٣٤"), 0);
        assert_eq!(convert_kw_to_hp("١ 110 kW"), "150 HP");
        assert_eq!(convert_kw_to_hp("١٢٠ kW"), "١٢٠ kW");
    }

    #[test]
    fn parse_price_strips_non_digits() {
        assert_eq!(parse_price("12.500 €"), 12500);
        assert_eq!(parse_price("14.990,00 €"), 1499000);
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("Na upit"), 0);
    }

    #[test]
    fn converts_kilowatts_to_horsepower() {
        assert_eq!(convert_kw_to_hp("110 kW"), "150 HP");
        assert_eq!(convert_kw_to_hp("81 kW"), "110 HP");
        assert_eq!(convert_kw_to_hp("nepoznato"), "nepoznato");
        assert_eq!(convert_kw_to_hp(""), "");
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let filter = CarFilter::default();
        for year in ["2014", "2016"] {
            assert!(filter.check(&car("VW", "DSG", year, "12000")).is_ok(), "{year}");
        }
        assert_eq!(
            filter.check(&car("VW", "DSG", "2013", "12000")),
            Err(Rejection::Year(2013))
        );
        assert_eq!(
            filter.check(&car("VW", "DSG", "2017", "12000")),
            Err(Rejection::Year(2017))
        );
        assert_eq!(
            filter.check(&car("VW", "DSG", "?", "12000")),
            Err(Rejection::Year(0))
        );
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filter = CarFilter::default();
        for price in ["10.000 €", "15.000 €"] {
            assert!(filter.check(&car("VW", "DSG", "2015", price)).is_ok(), "{price}");
        }
        assert_eq!(
            filter.check(&car("VW", "DSG", "2015", "9.999 €")),
            Err(Rejection::Price(9999))
        );
        assert_eq!(
            filter.check(&car("VW", "DSG", "2015", "15.001 €")),
            Err(Rejection::Price(15001))
        );
        assert_eq!(
            filter.check(&car("VW", "DSG", "2015", "")),
            Err(Rejection::Price(0))
        );
    }

    #[test]
    fn brand_and_gearbox_match_case_insensitively() {
        let filter = CarFilter::default();
        assert!(filter.check(&car("Volkswagen", "Automatski", "2015", "12000")).is_ok());
        assert!(filter.check(&car("vw", "dsg 7", "2015", "12000")).is_ok());
        assert!(filter.check(&car("VW", "Triptronic", "2015", "12000")).is_ok());
        assert_eq!(
            filter.check(&car("Škoda", "DSG", "2015", "12000")),
            Err(Rejection::Brand("Škoda".to_string()))
        );
        assert_eq!(
            filter.check(&car("VW", "Mehanički mjenjač", "2015", "12000")),
            Err(Rejection::Gearbox("Mehanički mjenjač".to_string()))
        );
    }

    #[test]
    fn first_failing_check_decides_the_reason() {
        let filter = CarFilter::default();
        // wrong brand, gearbox, year and price at once
        assert_eq!(
            filter.check(&car("Audi", "Ručni", "2010", "500")),
            Err(Rejection::Brand("Audi".to_string()))
        );
        assert_eq!(
            filter.check(&car("VW", "Ručni", "2010", "500")),
            Err(Rejection::Gearbox("Ručni".to_string()))
        );
    }

    #[test]
    fn apply_converts_power_only_for_survivors() {
        let outcome = CarFilter::default().apply(vec![
            car("VW", "DSG", "2015", "12.500 €"),
            car("VW", "DSG", "2012", "12.500 €"),
        ]);

        assert_eq!(outcome.passed.len(), 1);
        assert_eq!(outcome.passed[0].power, "150 HP");
        assert_eq!(outcome.rejections.count(&Rejection::Year(2012)), 1);
    }

    #[test]
    fn tally_counts_every_rejection_once() {
        let outcome = CarFilter::default().apply(vec![
            car("Audi", "DSG", "2015", "12000"),
            car("Audi", "DSG", "2015", "12000"),
            car("VW", "Ručni", "2015", "12000"),
            car("VW", "DSG", "2010", "12000"),
            car("VW", "DSG", "2010", "12000"),
            car("VW", "DSG", "2015", "12000"),
        ]);

        assert_eq!(outcome.passed.len(), 1);
        assert_eq!(outcome.rejections.len(), 3);
        assert_eq!(outcome.rejections.total(), 5);
        assert_eq!(outcome.rejections.count(&Rejection::Brand("Audi".to_string())), 2);
        assert_eq!(
            outcome.rejections.to_string(),
            "Brand: Audi (2), Gearbox: Ručni (1), Year: 2010 (2)"
        );
    }
}
