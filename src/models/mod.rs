use serde::{Deserialize, Serialize};

/// A listing as seen on a search results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdReference {
    pub url: String,
    /// Raw list-view price, may be empty
    pub price: String,
}

impl AdReference {
    pub fn new(url: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            price: price.into(),
        }
    }
}

/// Core listing data model, every attribute kept as scraped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarDetail {
    pub url: String,
    pub title: String,
    pub price: String,
    pub location: String,
    pub brand: String,
    pub model: String,
    #[serde(rename = "type")]
    pub car_type: String,
    pub year: String,
    pub model_year: String,
    pub mileage: String,
    pub engine: String,
    pub power: String,
    pub displacement: String,
    pub gearbox: String,
    pub gears: String,
    pub condition: String,
    pub service_book: String,
}

/// Attributes that can be filled from the label/value list of a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    Location,
    Brand,
    Model,
    Type,
    Year,
    ModelYear,
    Mileage,
    Engine,
    Power,
    Displacement,
    Gearbox,
    Gears,
    Condition,
    ServiceBook,
}

impl CarDetail {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn field_mut(&mut self, field: DetailField) -> &mut String {
        match field {
            DetailField::Location => &mut self.location,
            DetailField::Brand => &mut self.brand,
            DetailField::Model => &mut self.model,
            DetailField::Type => &mut self.car_type,
            DetailField::Year => &mut self.year,
            DetailField::ModelYear => &mut self.model_year,
            DetailField::Mileage => &mut self.mileage,
            DetailField::Engine => &mut self.engine,
            DetailField::Power => &mut self.power,
            DetailField::Displacement => &mut self.displacement,
            DetailField::Gearbox => &mut self.gearbox,
            DetailField::Gears => &mut self.gears,
            DetailField::Condition => &mut self.condition,
            DetailField::ServiceBook => &mut self.service_book,
        }
    }
}
