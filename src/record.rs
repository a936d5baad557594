//! The survey submission record and its fixed spreadsheet schema.
//!
//! The exhibition form submits lowercase ASCII field names; the spreadsheet
//! uses the capitalized Slovene column names the study team reads. The
//! mapping between the two is the `SURVEY_FIELDS` table below, and it is
//! deliberately closed: input keys that are not in the table are dropped, so
//! a submission can never grow the sheet sideways.

use chrono::Utc;
use chrono_tz::Europe::Ljubljana;
use serde_json::{Map, Value};

/// Server-filled columns at the front of each row.
const LEAD_COLUMNS: [&str; 2] = ["Časovni_žig", "ID"];

/// Request metadata columns at the end of each row.
const TAIL_COLUMNS: [&str; 2] = ["IP", "User_Agent"];

/// Survey fields in spreadsheet column order, as (column, input key) pairs.
const SURVEY_FIELDS: &[(&str, &str)] = &[
    // Demographics
    ("Ime", "ime"),
    ("Starost", "starost"),
    ("Datum", "datum"),
    ("Spol", "spol"),
    ("VR_izkušnje", "vr_izkusnje"),
    ("VR_opis", "vr_opis"),
    // Conversation implementation (1-5)
    ("Q1_Pogovor_organičen", "q1_pogovor_organicen"),
    ("Q2_Skulptura_razumela", "q2_skulptura_razumela"),
    ("Q3_Odgovori_smiselni", "q3_odgovori_smiselni"),
    ("Q4_Hitro_reagiral", "q4_hitro_reagiral"),
    // Animations (1-5)
    ("Q5_Animacije_naravno", "q5_animacije_naravno"),
    ("Q6_Animacije_pripomogle", "q6_animacije_pripomogle"),
    ("Q7_Telesne_animacije", "q7_telesne_animacije"),
    ("Q8_Lip_sync_pripomogle", "q8_lip_sync_pripomogle"),
    ("Q9_Lip_sync_naraven", "q9_lip_sync_naraven"),
    // User experience (1-5)
    ("Q10_Lip_sync_ustnic", "q10_lip_sync_ustnic"),
    ("Q11_Animacije_telesa", "q11_animacije_telesa"),
    ("Q12_Spomin_skulpture", "q12_spomin_skulpture"),
    ("Q13_Mašilni_avdio", "q13_masilni_avdio"),
    ("Q14_Efekt_mreže", "q14_efekt_mreze"),
    ("Q15_Interaktivni_elementi", "q15_interaktivni_elementi"),
    ("Q16_Uporabniški_vmesnik", "q16_uporabniski_vmesnik"),
    // Open questions
    ("Odprto1_Razstava", "odprto1_razstava"),
    ("Odprto2_Aspekti_pritegnili", "odprto2_aspekti_pritegnili"),
    ("Odprto3_Manjkajo_aspekti", "odprto3_manjkajo_aspekti"),
    ("Odprto4_Predlogi", "odprto4_predlogi"),
];

/// The two fields the form cannot omit. Empty values count as missing.
pub fn missing_required(data: &Map<String, Value>) -> bool {
    ["ime", "starost"].iter().any(|key| field(data, key).is_empty())
}

/// One completed submission, ready to be appended to the spreadsheet.
/// Immutable once constructed; `values` runs parallel to
/// [`SurveyResponse::columns`].
#[derive(Clone, Debug)]
pub struct SurveyResponse {
    pub id: String,
    values: Vec<String>,
}

impl SurveyResponse {
    /// Build a record from the submitted field mapping plus the request
    /// metadata. The id is the receipt time in Unix epoch milliseconds, which
    /// doubles as the row's external identifier. Millisecond granularity is
    /// as fine as it gets: two requests landing in the same millisecond get
    /// the same id, and each still appends its own row.
    pub fn new(data: &Map<String, Value>, ip: &str, user_agent: &str) -> Self {
        let now = Utc::now();
        let id = now.timestamp_millis().to_string();
        let timestamp = now
            .with_timezone(&Ljubljana)
            .format("%-d. %-m. %Y, %H:%M:%S")
            .to_string();

        let mut values = Vec::with_capacity(SURVEY_FIELDS.len() + 4);
        values.push(timestamp);
        values.push(id.clone());

        for (_, key) in SURVEY_FIELDS {
            values.push(field(data, key));
        }

        values.push(ip.to_owned());
        values.push(user_agent.to_owned());

        SurveyResponse { id, values }
    }

    /// The full header row, in spreadsheet order.
    pub fn columns() -> Vec<&'static str> {
        let mut cols = Vec::with_capacity(SURVEY_FIELDS.len() + 4);
        cols.extend(LEAD_COLUMNS);
        cols.extend(SURVEY_FIELDS.iter().map(|(col, _)| *col));
        cols.extend(TAIL_COLUMNS);
        cols
    }

    /// Cell values, parallel to [`Self::columns`].
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Look up a cell by its column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        Self::columns()
            .iter()
            .position(|c| *c == column)
            .map(|i| self.values[i].as_str())
    }
}

/// An absent or null field becomes the empty string; strings pass through
/// untouched; any other JSON value is rendered as its JSON text, since the
/// form is allowed to submit Likert answers as bare numbers.
fn field(data: &Map<String, Value>, key: &str) -> String {
    match data.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
