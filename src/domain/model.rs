use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The record collections the content repository exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Dogs,
    Litters,
    Breeders,
    Articles,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Dogs => "dogs",
            Collection::Litters => "litters",
            Collection::Breeders => "breeders",
            Collection::Articles => "articles",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Some(Sex::Male),
            "F" | "FEMALE" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// Coat colour: black (S), black-marked (SM) or blond (B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "S")]
    Black,
    #[serde(rename = "SM")]
    BlackMarked,
    #[serde(rename = "B")]
    Blond,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Black, Color::BlackMarked, Color::Blond];

    pub fn code(&self) -> &'static str {
        match self {
            Color::Black => "S",
            Color::BlackMarked => "SM",
            Color::Blond => "B",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Color::Black),
            "SM" => Some(Color::BlackMarked),
            "B" => Some(Color::Blond),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::BlackMarked => "black-marked",
            Color::Blond => "blond",
        }
    }
}

/// Lifecycle stage of a litter. Declaration order is the expected progression.
///
/// The repository spells the second stage `Manted`; both spellings are accepted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum LitterStatus {
    #[default]
    Planned,
    #[serde(rename = "Manted", alias = "Mated")]
    Mated,
    Littered,
    Closed,
}

impl LitterStatus {
    pub const ALL: [LitterStatus; 4] = [
        LitterStatus::Planned,
        LitterStatus::Mated,
        LitterStatus::Littered,
        LitterStatus::Closed,
    ];

    /// The value the content repository stores.
    pub fn wire_name(&self) -> &'static str {
        match self {
            LitterStatus::Planned => "Planned",
            LitterStatus::Mated => "Manted",
            LitterStatus::Littered => "Littered",
            LitterStatus::Closed => "Closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "planned" => Some(LitterStatus::Planned),
            "mated" | "manted" => Some(LitterStatus::Mated),
            "littered" => Some(LitterStatus::Littered),
            "closed" => Some(LitterStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for LitterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LitterStatus::Planned => "Planned",
            LitterStatus::Mated => "Mated",
            LitterStatus::Littered => "Littered",
            LitterStatus::Closed => "Closed",
        };
        f.write_str(label)
    }
}

/// A coordinate in degrees. Only constructed for finite, in-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        if lat_ok && lng_ok {
            Some(Self { lat, lng })
        } else {
            None
        }
    }

    /// Reads `{ "lat": .., "lng": .. }` where either value may be a number or a
    /// numeric string. Anything else is an unknown location.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let read = |key: &str| match value.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Self::new(read("lat")?, read("lng")?)
    }
}

fn deserialize_location<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(GeoPoint::from_json))
}

/// Accepts `YYYY-MM-DD` or a full timestamp; unreadable dates become `None`.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| {
        let day = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dog {
    #[serde(rename = "documentId", default)]
    pub id: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub full_kennel_name: Option<String>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date_of_death: Option<NaiveDate>,
    #[serde(default)]
    pub microchip_no: Option<String>,
    #[serde(rename = "cFertile", default)]
    pub is_fertile: Option<bool>,
    #[serde(rename = "HDTest", default)]
    pub hd_test: Option<bool>,
    #[serde(rename = "Sod1Test", default)]
    pub sod1_test: Option<bool>,
    #[serde(rename = "HeartCheck", default)]
    pub heart_check: Option<bool>,
    #[serde(rename = "EyesCheck", default)]
    pub eyes_check: Option<bool>,
    #[serde(rename = "Location", default, deserialize_with = "deserialize_location")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub father: Option<Box<Dog>>,
    #[serde(default)]
    pub mother: Option<Box<Dog>>,
}

impl Dog {
    /// Kennel name, else given name, else "Unknown".
    pub fn display_name(&self) -> &str {
        non_blank(&self.full_kennel_name)
            .or_else(|| non_blank(&self.given_name))
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "FullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "Address1", default)]
    pub address1: Option<String>,
    #[serde(rename = "Address2", default)]
    pub address2: Option<String>,
    #[serde(rename = "CountryCode", default)]
    pub country_code: Option<String>,
    #[serde(rename = "Zip", default)]
    pub zip: Option<String>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<Address>,
    #[serde(rename = "Location", default, deserialize_with = "deserialize_location")]
    pub location: Option<GeoPoint>,
}

impl Member {
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [non_blank(&self.first_name), non_blank(&self.last_name)]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breeder {
    #[serde(rename = "documentId", default)]
    pub id: String,
    #[serde(default)]
    pub kennel_name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub disabled: Option<bool>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(rename = "GeoLocation", default, deserialize_with = "deserialize_location")]
    pub geo_location: Option<GeoPoint>,
    #[serde(rename = "WebsiteUrl", default)]
    pub website_url: Option<String>,
    #[serde(rename = "WebsiteUrlDraft", default)]
    pub website_url_draft: Option<String>,
    #[serde(rename = "BreedersIntroduction", default)]
    pub introduction: Option<String>,
    #[serde(rename = "BreedersIntroDraft", default)]
    pub introduction_draft: Option<String>,
    #[serde(default)]
    pub is_dirty: bool,
}

impl Breeder {
    pub fn display_name(&self) -> &str {
        non_blank(&self.kennel_name).unwrap_or("Unknown")
    }

    /// Active and not disabled.
    pub fn is_listed(&self) -> bool {
        self.is_active == Some(true) && self.disabled != Some(true)
    }

    /// Draft text awaits moderation before it becomes public.
    pub fn pending_moderation(&self) -> bool {
        let differs = |draft: &Option<String>, published: &Option<String>| {
            non_blank(draft).is_some() && non_blank(draft) != non_blank(published)
        };
        self.is_dirty
            || differs(&self.website_url_draft, &self.website_url)
            || differs(&self.introduction_draft, &self.introduction)
    }

    /// The kennel's own coordinates, else the owning member's.
    pub fn location(&self) -> Option<GeoPoint> {
        self.geo_location
            .or_else(|| self.member.as_ref().and_then(|m| m.location))
    }
}

/// Counter pair for one sex/colour combination within a litter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuppyAmount {
    #[serde(rename = "Total", default)]
    pub total: i32,
    #[serde(rename = "Available", default)]
    pub available: i32,
}

impl PuppyAmount {
    pub fn new(total: i32, available: i32) -> Self {
        Self { total, available }
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<PuppyAmount, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PuppyAmount>::deserialize(deserializer)?.unwrap_or_default())
}

/// One of the six (sex x colour) puppy counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AmountSlot {
    pub sex: Sex,
    pub color: Color,
}

impl AmountSlot {
    pub const ALL: [AmountSlot; 6] = [
        AmountSlot::new(Sex::Male, Color::Black),
        AmountSlot::new(Sex::Male, Color::BlackMarked),
        AmountSlot::new(Sex::Male, Color::Blond),
        AmountSlot::new(Sex::Female, Color::Black),
        AmountSlot::new(Sex::Female, Color::BlackMarked),
        AmountSlot::new(Sex::Female, Color::Blond),
    ];

    pub const fn new(sex: Sex, color: Color) -> Self {
        Self { sex, color }
    }

    /// Short code used on the command line: `rs`, `hsm`, ...
    pub fn code(&self) -> String {
        let sex = match self.sex {
            Sex::Male => "r",
            Sex::Female => "h",
        };
        format!("{}{}", sex, self.color.code().to_ascii_lowercase())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|slot| slot.code() == raw)
    }

    /// Field name of the slot in the content repository (`AmountRS`, ...).
    pub fn wire_name(&self) -> String {
        format!("Amount{}", self.code().to_ascii_uppercase())
    }

    pub fn label(&self) -> String {
        let sex = match self.sex {
            Sex::Male => "male",
            Sex::Female => "female",
        };
        format!("{} {}", sex, self.color.label())
    }
}

impl fmt::Display for AmountSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuppyAmounts {
    #[serde(rename = "AmountRS", default, deserialize_with = "deserialize_amount")]
    pub male_black: PuppyAmount,
    #[serde(rename = "AmountRSM", default, deserialize_with = "deserialize_amount")]
    pub male_black_marked: PuppyAmount,
    #[serde(rename = "AmountRB", default, deserialize_with = "deserialize_amount")]
    pub male_blond: PuppyAmount,
    #[serde(rename = "AmountHS", default, deserialize_with = "deserialize_amount")]
    pub female_black: PuppyAmount,
    #[serde(rename = "AmountHSM", default, deserialize_with = "deserialize_amount")]
    pub female_black_marked: PuppyAmount,
    #[serde(rename = "AmountHB", default, deserialize_with = "deserialize_amount")]
    pub female_blond: PuppyAmount,
}

impl PuppyAmounts {
    pub fn get(&self, slot: AmountSlot) -> PuppyAmount {
        match (slot.sex, slot.color) {
            (Sex::Male, Color::Black) => self.male_black,
            (Sex::Male, Color::BlackMarked) => self.male_black_marked,
            (Sex::Male, Color::Blond) => self.male_blond,
            (Sex::Female, Color::Black) => self.female_black,
            (Sex::Female, Color::BlackMarked) => self.female_black_marked,
            (Sex::Female, Color::Blond) => self.female_blond,
        }
    }

    pub fn get_mut(&mut self, slot: AmountSlot) -> &mut PuppyAmount {
        match (slot.sex, slot.color) {
            (Sex::Male, Color::Black) => &mut self.male_black,
            (Sex::Male, Color::BlackMarked) => &mut self.male_black_marked,
            (Sex::Male, Color::Blond) => &mut self.male_blond,
            (Sex::Female, Color::Black) => &mut self.female_black,
            (Sex::Female, Color::BlackMarked) => &mut self.female_black_marked,
            (Sex::Female, Color::Blond) => &mut self.female_blond,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AmountSlot, PuppyAmount)> + '_ {
        AmountSlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }

    pub fn total_puppies(&self) -> i64 {
        self.iter().map(|(_, amount)| i64::from(amount.total)).sum()
    }

    pub fn total_available(&self) -> i64 {
        self.iter().map(|(_, amount)| i64::from(amount.available)).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Litter {
    #[serde(rename = "documentId", default)]
    pub id: String,
    #[serde(rename = "OrderLetter", default)]
    pub order_letter: Option<String>,
    #[serde(default)]
    pub breeder: Option<Breeder>,
    #[serde(default)]
    pub mother: Option<Dog>,
    #[serde(rename = "stuntDog", default)]
    pub stunt_dog: Option<Dog>,
    #[serde(rename = "LitterStatus", default)]
    pub status: LitterStatus,
    #[serde(rename = "plannedDateOfBirth", default, deserialize_with = "deserialize_date")]
    pub planned_date_of_birth: Option<NaiveDate>,
    #[serde(rename = "expectedDateOfBirth", default, deserialize_with = "deserialize_date")]
    pub expected_date_of_birth: Option<NaiveDate>,
    #[serde(rename = "dateOfBirth", default, deserialize_with = "deserialize_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "dateOfManting", default, deserialize_with = "deserialize_date")]
    pub date_of_mating: Option<NaiveDate>,
    #[serde(rename = "StatusMessage", default)]
    pub status_message: Option<String>,
    #[serde(rename = "StatusMessageDraft", default)]
    pub status_message_draft: Option<String>,
    #[serde(rename = "StatusMessageDirtyFlag", default)]
    pub status_message_dirty: bool,
    #[serde(flatten)]
    pub amounts: PuppyAmounts,
}

impl Litter {
    /// "A-Wurf"-style heading: order letter plus kennel name when known.
    pub fn title(&self) -> String {
        let letter = non_blank(&self.order_letter).unwrap_or("?");
        match self.breeder.as_ref() {
            Some(breeder) => format!("{}-litter {}", letter, breeder.display_name()),
            None => format!("{}-litter", letter),
        }
    }

    /// The date that matters for the current lifecycle stage.
    pub fn relevant_date(&self) -> Option<NaiveDate> {
        match self.status {
            LitterStatus::Planned => self.planned_date_of_birth,
            LitterStatus::Mated => self.expected_date_of_birth,
            LitterStatus::Littered | LitterStatus::Closed => self.date_of_birth,
        }
    }

    /// Litters are located at their breeder.
    pub fn location(&self) -> Option<GeoPoint> {
        self.breeder.as_ref().and_then(Breeder::location)
    }
}

/// Staged litter edit sent to the repository as a single update.
///
/// Reference and date fields are `None` when not sent and `Some(None)` when
/// sent as `null`, which clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LitterUpdate {
    #[serde(rename = "LitterStatus")]
    pub status: LitterStatus,
    #[serde(rename = "StatusMessageDraft", skip_serializing_if = "Option::is_none")]
    pub status_message_draft: Option<String>,
    #[serde(rename = "mother", skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<Option<String>>,
    #[serde(rename = "stuntDog", skip_serializing_if = "Option::is_none")]
    pub stunt_dog_id: Option<Option<String>>,
    #[serde(rename = "plannedDateOfBirth", skip_serializing_if = "Option::is_none")]
    pub planned_date_of_birth: Option<Option<NaiveDate>>,
    #[serde(rename = "expectedDateOfBirth", skip_serializing_if = "Option::is_none")]
    pub expected_date_of_birth: Option<Option<NaiveDate>>,
    #[serde(rename = "dateOfBirth", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(flatten)]
    pub amounts: PuppyAmounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "documentId", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
}

/// One page of a collection. Category feeds come without `page_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub nodes: Vec<T>,
    pub page_info: Option<PageInfo>,
}

impl<T> Page<T> {
    pub fn new(nodes: Vec<T>, page_info: PageInfo) -> Self {
        Self {
            nodes,
            page_info: Some(page_info),
        }
    }

    pub fn without_info(nodes: Vec<T>) -> Self {
        Self {
            nodes,
            page_info: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dog_display_name_fallbacks() {
        let mut dog = Dog {
            given_name: Some("Rex".to_string()),
            ..Default::default()
        };
        assert_eq!(dog.display_name(), "Rex");

        dog.full_kennel_name = Some("Rex vom Waldrand".to_string());
        assert_eq!(dog.display_name(), "Rex vom Waldrand");

        let nameless = Dog::default();
        assert_eq!(nameless.display_name(), "Unknown");

        let blank = Dog {
            full_kennel_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.display_name(), "Unknown");
    }

    #[test]
    fn test_litter_status_accepts_both_spellings() {
        let manted: LitterStatus = serde_json::from_str("\"Manted\"").unwrap();
        let mated: LitterStatus = serde_json::from_str("\"Mated\"").unwrap();
        assert_eq!(manted, LitterStatus::Mated);
        assert_eq!(mated, LitterStatus::Mated);
        assert_eq!(serde_json::to_string(&mated).unwrap(), "\"Manted\"");
        assert!(LitterStatus::Planned < LitterStatus::Closed);
    }

    #[test]
    fn test_dog_from_repository_json() {
        let json = serde_json::json!({
            "documentId": "d1",
            "givenName": "Bella",
            "fullKennelName": null,
            "sex": "F",
            "color": "SM",
            "dateOfBirth": "2019-04-02",
            "Location": { "lat": "52.1", "lng": 13.2 },
            "father": null,
            "mother": { "givenName": "Anka" }
        });

        let dog: Dog = serde_json::from_value(json).unwrap();
        assert_eq!(dog.id, "d1");
        assert_eq!(dog.sex, Some(Sex::Female));
        assert_eq!(dog.color, Some(Color::BlackMarked));
        assert_eq!(dog.date_of_birth, NaiveDate::from_ymd_opt(2019, 4, 2));
        assert_eq!(dog.location, GeoPoint::new(52.1, 13.2));
        assert!(dog.father.is_none());
        assert_eq!(dog.mother.as_ref().map(|m| m.display_name()), Some("Anka"));
    }

    #[test]
    fn test_invalid_location_is_unknown() {
        let json = serde_json::json!({ "documentId": "d2", "Location": { "lat": null, "lng": 10.0 } });
        let dog: Dog = serde_json::from_value(json).unwrap();
        assert_eq!(dog.location, None);

        assert_eq!(GeoPoint::new(91.0, 0.0), None);
        assert_eq!(GeoPoint::new(0.0, f64::NAN), None);
    }

    #[test]
    fn test_litter_amounts_from_json_with_nulls() {
        let json = serde_json::json!({
            "documentId": "l1",
            "LitterStatus": "Littered",
            "AmountRS": { "Total": 3, "Available": 1 },
            "AmountHB": null
        });

        let litter: Litter = serde_json::from_value(json).unwrap();
        assert_eq!(litter.status, LitterStatus::Littered);
        assert_eq!(litter.amounts.male_black, PuppyAmount::new(3, 1));
        assert_eq!(litter.amounts.female_blond, PuppyAmount::default());
        assert_eq!(litter.amounts.total_puppies(), 3);
    }

    #[test]
    fn test_amount_slot_codes() {
        let slot = AmountSlot::parse("HSM").unwrap();
        assert_eq!(slot, AmountSlot::new(Sex::Female, Color::BlackMarked));
        assert_eq!(slot.wire_name(), "AmountHSM");
        assert_eq!(AmountSlot::parse("xx"), None);
    }

    #[test]
    fn test_breeder_moderation_and_location() {
        let breeder = Breeder {
            website_url: Some("https://old.example".to_string()),
            website_url_draft: Some("https://new.example".to_string()),
            member: Some(Member {
                location: GeoPoint::new(50.0, 8.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(breeder.pending_moderation());
        assert_eq!(breeder.location(), GeoPoint::new(50.0, 8.0));
        assert!(!breeder.is_listed());
    }
}
