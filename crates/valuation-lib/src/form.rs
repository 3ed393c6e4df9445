//! Property details form
//!
//! Every control carries its own bounds and default. Out-of-range input is
//! clamped to the nearest bound rather than rejected, so a submitted form
//! always yields a complete, in-bounds [`PropertyRecord`].

use crate::error::InputError;
use crate::models::{fields, PropertyRecord};
use serde::{Deserialize, Serialize};

pub const FORM_TITLE: &str = "Mumbai Real Estate Investment Intelligence System";

/// Bounds and default of an integer stepper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountBound {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl CountBound {
    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(self.min as i64, self.max as i64) as u32
    }
}

pub const AREA_MIN: f64 = 200.0;
pub const AREA_MAX: f64 = 10_000.0;
pub const AREA_DEFAULT: f64 = 900.0;

pub const BEDROOMS: CountBound = CountBound { min: 1, max: 10, default: 2 };
pub const BATHROOMS: CountBound = CountBound { min: 1, max: 10, default: 2 };
pub const BALCONIES: CountBound = CountBound { min: 0, max: 5, default: 1 };
pub const AGE: CountBound = CountBound { min: 0, max: 100, default: 5 };
pub const TOTAL_FLOORS: CountBound = CountBound { min: 1, max: 100, default: 15 };

pub const LATITUDE_DEFAULT: f64 = 19.0760;
pub const LONGITUDE_DEFAULT: f64 = 72.8777;
pub const LOCALITY_DEFAULT: &str = "Andheri West";

/// Cities the model covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum City {
    #[default]
    Mumbai,
}

impl City {
    pub const ALL: [City; 1] = [City::Mumbai];

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Mumbai => "Mumbai",
        }
    }
}

/// Kind of residential property
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    Apartment,
    Villa,
    #[serde(rename = "Independent House")]
    IndependentHouse,
}

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::IndependentHouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::Villa => "Villa",
            PropertyType::IndependentHouse => "Independent House",
        }
    }
}

/// Furnishing status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Furnishing {
    #[default]
    Unfurnished,
    #[serde(rename = "Semi-Furnished")]
    SemiFurnished,
    Furnished,
}

impl Furnishing {
    pub const ALL: [Furnishing; 3] = [
        Furnishing::Unfurnished,
        Furnishing::SemiFurnished,
        Furnishing::Furnished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Furnishing::Unfurnished => "Unfurnished",
            Furnishing::SemiFurnished => "Semi-Furnished",
            Furnishing::Furnished => "Furnished",
        }
    }
}

/// Resolve a select control's label to its choice
fn parse_choice<T: Copy>(
    field: &'static str,
    value: &str,
    all: &[T],
    label: fn(&T) -> &'static str,
) -> Result<T, InputError> {
    all.iter()
        .find(|choice| label(choice).eq_ignore_ascii_case(value.trim()))
        .copied()
        .ok_or_else(|| InputError::UnknownChoice {
            field,
            value: value.to_string(),
            choices: all.iter().map(label).collect::<Vec<_>>().join(", "),
        })
}

/// Partially filled form as submitted by a client
///
/// Missing entries take the control's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub area: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub balconies: Option<i64>,
    pub age: Option<i64>,
    pub total_floors: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub property_type: Option<String>,
    pub furnished: Option<String>,
}

/// Current state of the property details form
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyForm {
    area: f64,
    bedrooms: u32,
    bathrooms: u32,
    balconies: u32,
    age: u32,
    total_floors: u32,
    latitude: f64,
    longitude: f64,
    city: City,
    locality: String,
    property_type: PropertyType,
    furnished: Furnishing,
}

impl Default for PropertyForm {
    fn default() -> Self {
        Self {
            area: AREA_DEFAULT,
            bedrooms: BEDROOMS.default,
            bathrooms: BATHROOMS.default,
            balconies: BALCONIES.default,
            age: AGE.default,
            total_floors: TOTAL_FLOORS.default,
            latitude: LATITUDE_DEFAULT,
            longitude: LONGITUDE_DEFAULT,
            city: City::default(),
            locality: LOCALITY_DEFAULT.to_string(),
            property_type: PropertyType::default(),
            furnished: Furnishing::default(),
        }
    }
}

impl PropertyForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the form from client input, clamping every numeric entry
    pub fn from_input(input: &FormInput) -> Result<Self, InputError> {
        let mut form = Self::default();

        if let Some(area) = input.area {
            form.set_area(area);
        }
        if let Some(n) = input.bedrooms {
            form.set_bedrooms(n);
        }
        if let Some(n) = input.bathrooms {
            form.set_bathrooms(n);
        }
        if let Some(n) = input.balconies {
            form.set_balconies(n);
        }
        if let Some(n) = input.age {
            form.set_age(n);
        }
        if let Some(n) = input.total_floors {
            form.set_total_floors(n);
        }
        if let Some(lat) = input.latitude {
            form.set_latitude(lat);
        }
        if let Some(lon) = input.longitude {
            form.set_longitude(lon);
        }
        if let Some(city) = &input.city {
            form.city = parse_choice(fields::CITY, city, &City::ALL, City::as_str)?;
        }
        if let Some(locality) = &input.locality {
            form.set_locality(locality);
        }
        if let Some(kind) = &input.property_type {
            form.property_type = parse_choice(
                fields::PROPERTY_TYPE,
                kind,
                &PropertyType::ALL,
                PropertyType::as_str,
            )?;
        }
        if let Some(furnished) = &input.furnished {
            form.furnished = parse_choice(
                fields::FURNISHED,
                furnished,
                &Furnishing::ALL,
                Furnishing::as_str,
            )?;
        }

        Ok(form)
    }

    pub fn set_area(&mut self, area: f64) -> f64 {
        self.area = if area.is_nan() {
            AREA_MIN
        } else {
            area.clamp(AREA_MIN, AREA_MAX)
        };
        self.area
    }

    pub fn set_bedrooms(&mut self, n: i64) -> u32 {
        self.bedrooms = BEDROOMS.clamp(n);
        self.bedrooms
    }

    pub fn set_bathrooms(&mut self, n: i64) -> u32 {
        self.bathrooms = BATHROOMS.clamp(n);
        self.bathrooms
    }

    pub fn set_balconies(&mut self, n: i64) -> u32 {
        self.balconies = BALCONIES.clamp(n);
        self.balconies
    }

    pub fn set_age(&mut self, years: i64) -> u32 {
        self.age = AGE.clamp(years);
        self.age
    }

    pub fn set_total_floors(&mut self, n: i64) -> u32 {
        self.total_floors = TOTAL_FLOORS.clamp(n);
        self.total_floors
    }

    pub fn set_latitude(&mut self, latitude: f64) -> f64 {
        self.latitude = if latitude.is_finite() {
            latitude
        } else {
            LATITUDE_DEFAULT
        };
        self.latitude
    }

    pub fn set_longitude(&mut self, longitude: f64) -> f64 {
        self.longitude = if longitude.is_finite() {
            longitude
        } else {
            LONGITUDE_DEFAULT
        };
        self.longitude
    }

    pub fn set_locality(&mut self, locality: &str) {
        self.locality = locality.trim().to_string();
    }

    pub fn set_property_type(&mut self, property_type: PropertyType) {
        self.property_type = property_type;
    }

    pub fn set_furnished(&mut self, furnished: Furnishing) {
        self.furnished = furnished;
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn bedrooms(&self) -> u32 {
        self.bedrooms
    }

    pub fn bathrooms(&self) -> u32 {
        self.bathrooms
    }

    pub fn balconies(&self) -> u32 {
        self.balconies
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn total_floors(&self) -> u32 {
        self.total_floors
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn locality(&self) -> &str {
        &self.locality
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn furnished(&self) -> Furnishing {
        self.furnished
    }

    /// Assemble the record handed to the predictor
    pub fn submit(&self) -> PropertyRecord {
        PropertyRecord::default()
            .with(fields::AREA, self.area)
            .with(fields::BEDROOM_NUM, self.bedrooms)
            .with(fields::BATHROOM_NUM, self.bathrooms)
            .with(fields::BALCONY_NUM, self.balconies)
            .with(fields::AGE, self.age)
            .with(fields::TOTAL_FLOORS, self.total_floors)
            .with(fields::LATITUDE, self.latitude)
            .with(fields::LONGITUDE, self.longitude)
            .with(fields::CITY, self.city.as_str())
            .with(fields::LOCALITY, self.locality.as_str())
            .with(fields::PROPERTY_TYPE, self.property_type.as_str())
            .with(fields::FURNISHED, self.furnished.as_str())
    }
}

/// How a control is rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        default: f64,
        step: f64,
        decimals: u8,
    },
    Select {
        choices: Vec<String>,
        default: String,
        locked: bool,
    },
    Text {
        default: String,
    },
}

/// One input on the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub control: Control,
}

/// Everything a surface needs to render the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub title: String,
    pub fields: Vec<FormField>,
}

fn count_field(name: &str, label: &str, bound: CountBound) -> FormField {
    FormField {
        name: name.to_string(),
        label: label.to_string(),
        control: Control::Number {
            min: Some(bound.min as f64),
            max: Some(bound.max as f64),
            default: bound.default as f64,
            step: 1.0,
            decimals: 0,
        },
    }
}

fn select_field<T>(
    name: &str,
    label: &str,
    all: &[T],
    default: &T,
    as_str: fn(&T) -> &'static str,
) -> FormField {
    FormField {
        name: name.to_string(),
        label: label.to_string(),
        control: Control::Select {
            choices: all.iter().map(|c| as_str(c).to_string()).collect(),
            default: as_str(default).to_string(),
            locked: all.len() == 1,
        },
    }
}

/// Describe the form's controls in display order
pub fn form_schema() -> FormSchema {
    let coordinate = |name: &str, label: &str, default: f64| FormField {
        name: name.to_string(),
        label: label.to_string(),
        control: Control::Number {
            min: None,
            max: None,
            default,
            step: 0.0001,
            decimals: 6,
        },
    };

    FormSchema {
        title: FORM_TITLE.to_string(),
        fields: vec![
            FormField {
                name: "area".to_string(),
                label: "Area (sqft)".to_string(),
                control: Control::Number {
                    min: Some(AREA_MIN),
                    max: Some(AREA_MAX),
                    default: AREA_DEFAULT,
                    step: 1.0,
                    decimals: 0,
                },
            },
            count_field("bedrooms", "Bedrooms", BEDROOMS),
            count_field("bathrooms", "Bathrooms", BATHROOMS),
            count_field("balconies", "Balconies", BALCONIES),
            count_field("age", "Property Age (years)", AGE),
            count_field("total_floors", "Total Floors in Building", TOTAL_FLOORS),
            coordinate("latitude", "Latitude", LATITUDE_DEFAULT),
            coordinate("longitude", "Longitude", LONGITUDE_DEFAULT),
            select_field("city", "City", &City::ALL, &City::Mumbai, City::as_str),
            FormField {
                name: "locality".to_string(),
                label: "Locality".to_string(),
                control: Control::Text {
                    default: LOCALITY_DEFAULT.to_string(),
                },
            },
            select_field(
                "property_type",
                "Property Type",
                &PropertyType::ALL,
                &PropertyType::default(),
                PropertyType::as_str,
            ),
            select_field(
                "furnished",
                "Furnishing",
                &Furnishing::ALL,
                &Furnishing::default(),
                Furnishing::as_str,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, NUMERIC_BOUNDS};

    #[test]
    fn test_defaults_produce_complete_record() {
        let record = PropertyForm::new().submit();

        assert_eq!(record.len(), fields::ALL.len());
        for name in fields::ALL {
            assert!(record.contains(name), "missing {}", name);
        }
        assert_eq!(record.number(fields::AREA), Ok(900.0));
        assert_eq!(record.number(fields::TOTAL_FLOORS), Ok(15.0));
        assert_eq!(record.text(fields::LOCALITY), Ok("Andheri West"));
        assert_eq!(record.text(fields::FURNISHED), Ok("Unfurnished"));
        assert!(record.check_bounds().is_ok());
    }

    #[test]
    fn test_numeric_setters_clamp_to_nearest_bound() {
        let mut form = PropertyForm::new();

        assert_eq!(form.set_area(50.0), AREA_MIN);
        assert_eq!(form.set_area(25_000.0), AREA_MAX);
        assert_eq!(form.set_area(f64::INFINITY), AREA_MAX);
        assert_eq!(form.set_area(f64::NAN), AREA_MIN);
        assert_eq!(form.set_area(1234.5), 1234.5);

        assert_eq!(form.set_bedrooms(0), 1);
        assert_eq!(form.set_bedrooms(11), 10);
        assert_eq!(form.set_bathrooms(-3), 1);
        assert_eq!(form.set_bathrooms(99), 10);
        assert_eq!(form.set_balconies(-1), 0);
        assert_eq!(form.set_balconies(6), 5);
        assert_eq!(form.set_age(-1), 0);
        assert_eq!(form.set_age(250), 100);
        assert_eq!(form.set_total_floors(0), 1);
        assert_eq!(form.set_total_floors(i64::MAX), 100);
    }

    #[test]
    fn test_clamped_form_always_passes_bounds() {
        let input = FormInput {
            area: Some(-5.0),
            bedrooms: Some(100),
            bathrooms: Some(0),
            balconies: Some(42),
            age: Some(-7),
            total_floors: Some(1_000),
            ..FormInput::default()
        };
        let record = PropertyForm::from_input(&input).unwrap().submit();
        assert!(record.check_bounds().is_ok());

        for (field, min, max) in NUMERIC_BOUNDS {
            let value = record.number(field).unwrap();
            assert!(value == min || value == max, "{} = {}", field, value);
        }
    }

    #[test]
    fn test_coordinates_are_unconstrained() {
        let mut form = PropertyForm::new();
        assert_eq!(form.set_latitude(-89.5), -89.5);
        assert_eq!(form.set_longitude(179.25), 179.25);
        assert_eq!(form.set_latitude(f64::NAN), LATITUDE_DEFAULT);
    }

    #[test]
    fn test_from_input_parses_choices() {
        let input = FormInput {
            property_type: Some("independent house".to_string()),
            furnished: Some("Semi-Furnished".to_string()),
            locality: Some("  Bandra West ".to_string()),
            ..FormInput::default()
        };
        let form = PropertyForm::from_input(&input).unwrap();
        assert_eq!(form.property_type(), PropertyType::IndependentHouse);
        assert_eq!(form.furnished(), Furnishing::SemiFurnished);
        assert_eq!(form.locality(), "Bandra West");

        let record = form.submit();
        assert_eq!(
            record.get(fields::PROPERTY_TYPE),
            Some(&FieldValue::Text("Independent House".to_string()))
        );
    }

    #[test]
    fn test_from_input_rejects_unknown_choice() {
        let input = FormInput {
            property_type: Some("Penthouse".to_string()),
            ..FormInput::default()
        };
        let err = PropertyForm::from_input(&input).unwrap_err();
        assert!(matches!(
            err,
            InputError::UnknownChoice { field: "property_type", .. }
        ));

        let input = FormInput {
            city: Some("Pune".to_string()),
            ..FormInput::default()
        };
        assert!(PropertyForm::from_input(&input).is_err());
    }

    #[test]
    fn test_form_input_deserializes_partial_json() {
        let input: FormInput = serde_json::from_str(r#"{"area": 1500, "bedrooms": 3}"#).unwrap();
        assert_eq!(input.area, Some(1500.0));
        assert_eq!(input.bedrooms, Some(3));
        assert_eq!(input.city, None);
    }

    #[test]
    fn test_schema_lists_every_control() {
        let schema = form_schema();
        assert_eq!(schema.fields.len(), 12);

        let city = schema.fields.iter().find(|f| f.name == "city").unwrap();
        assert!(matches!(&city.control, Control::Select { locked: true, .. }));

        let area = &schema.fields[0];
        assert_eq!(
            area.control,
            Control::Number {
                min: Some(200.0),
                max: Some(10_000.0),
                default: 900.0,
                step: 1.0,
                decimals: 0
            }
        );

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["fields"][1]["kind"], "number");
        assert_eq!(json["fields"][10]["choices"][2], "Independent House");
    }
}
