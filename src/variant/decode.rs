//! Decoding of MyVariant.info query responses.
//!
//! The service is loose about shapes: the `clinvar` annotation and its `rcv`
//! review records can be a single object or a list, and scalar fields can be
//! strings or numbers. Each of these is decoded into an explicit variant with
//! a fallback branch, so that one odd record never fails a whole query.

use log::debug;
use serde::Deserialize;
use serde_json::{Number, Value};

// ----------------------------------------------------------------------------
// Query Response

/// Top-level body of a `/query` response.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct QueryResponse {
    /// Total number of matches on the server, which can exceed the hits returned.
    #[serde(default)]
    pub total: Option<u64>,
    /// Raw hits, decoded one at a time with [`Hit::from_value`].
    #[serde(default)]
    pub hits: Option<Vec<Value>>,
}

// ----------------------------------------------------------------------------
// Hit

/// One variant document from the service.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Hit {
    /// Variant identifier (HGVS genomic notation).
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// ClinVar annotation, one object or a list of them.
    #[serde(default)]
    pub clinvar: OneOrMany<ClinVar>,
}

impl Hit {
    /// Decode a hit, keeping at least the identifier when the rest is malformed.
    ///
    /// ```rust
    /// use clinvar_study::variant::decode::Hit;
    /// let value = serde_json::json!({"_id": "chr17:g.7673802C>T", "clinvar": 5});
    /// let hit = Hit::from_value(value);
    /// assert_eq!(hit.id.as_deref(), Some("chr17:g.7673802C>T"));
    /// assert!(hit.clinvar.first().is_none());
    /// ```
    pub fn from_value(value: Value) -> Hit {
        match Hit::deserialize(&value) {
            Ok(hit) => hit,
            Err(e) => {
                debug!("Falling back to identifier only for malformed hit: {e}");
                let id = value.get("_id").and_then(Value::as_str).map(String::from);
                Hit { id, ..Default::default() }
            }
        }
    }

    /// The first ClinVar annotation of this hit, if any.
    pub fn clinvar(&self) -> Option<&ClinVar> {
        self.clinvar.first()
    }
}

// ----------------------------------------------------------------------------
// ClinVar

/// The `clinvar` annotation block of a hit.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ClinVar {
    /// Review records (RCV accessions), one object or a list of them.
    #[serde(default)]
    pub rcv: OneOrMany<ReviewRecord>,
    /// Coordinates on the hg19 genome build, normally a single object.
    #[serde(default)]
    pub hg19: OneOrMany<GenomeBuild>,
    /// Chromosome name.
    #[serde(default)]
    pub chrom: Option<Scalar>,
}

impl ClinVar {
    /// Clinical significance of the first review record.
    pub fn significance(&self) -> Option<String> {
        self.rcv.first()?.clinical_significance.as_ref()?.as_text()
    }

    /// Chromosome name, numbers are converted to text.
    pub fn chromosome(&self) -> Option<String> {
        match self.chrom.as_ref()? {
            Scalar::Text(text) => Some(text.clone()),
            Scalar::Number(n) => Some(n.to_string()),
            Scalar::Other(_) => None,
        }
    }

    /// Start coordinate on hg19.
    pub fn position(&self) -> Option<u64> {
        self.hg19.first()?.start.as_ref()?.as_integer()
    }
}

/// A single review record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ReviewRecord {
    #[serde(default)]
    pub clinical_significance: Option<Scalar>,
}

/// Coordinates on a genome build.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GenomeBuild {
    #[serde(default)]
    pub start: Option<Scalar>,
    #[serde(default)]
    pub end: Option<Scalar>,
}

// ----------------------------------------------------------------------------
// Shapes

/// A field that may hold a list, a single value, or something else entirely.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
    Other(Value),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Other(Value::Null)
    }
}

impl<T> OneOrMany<T> {
    /// The first element of a list, or the single value.
    ///
    /// ```rust
    /// use clinvar_study::variant::decode::OneOrMany;
    /// assert_eq!(OneOrMany::Many(vec![1, 2]).first(), Some(&1));
    /// assert_eq!(OneOrMany::One(3).first(), Some(&3));
    /// assert_eq!(OneOrMany::<u8>::Many(vec![]).first(), None);
    /// assert_eq!(OneOrMany::<u8>::default().first(), None);
    /// ```
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::Many(values) => values.first(),
            OneOrMany::One(value) => Some(value),
            OneOrMany::Other(_) => None,
        }
    }
}

/// A scalar JSON value.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Other(Value),
}

impl Scalar {
    /// Text value, only for strings.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Non-negative integer value, from a number or a string holding one.
    ///
    /// ```rust
    /// use clinvar_study::variant::decode::Scalar;
    /// let scalar: Scalar = serde_json::from_str("7673802")?;
    /// assert_eq!(scalar.as_integer(), Some(7673802));
    /// let scalar: Scalar = serde_json::from_str("\"41276045\"")?;
    /// assert_eq!(scalar.as_integer(), Some(41276045));
    /// let scalar: Scalar = serde_json::from_str("\"unknown\"")?;
    /// assert_eq!(scalar.as_integer(), None);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Scalar::Number(n) => n.as_u64(),
            Scalar::Text(text) => text.trim().parse().ok(),
            Scalar::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::{Report, Result};
    use serde_json::json;

    #[test]
    fn rcv_list_uses_first_record() -> Result<(), Report> {
        let clinvar: ClinVar = serde_json::from_value(json!({
            "rcv": [
                {"clinical_significance": "Pathogenic"},
                {"clinical_significance": "Benign"}
            ]
        }))?;
        assert_eq!(clinvar.significance().as_deref(), Some("Pathogenic"));
        Ok(())
    }

    #[test]
    fn rcv_single_object() -> Result<(), Report> {
        let clinvar: ClinVar = serde_json::from_value(json!({
            "rcv": {"accession": "RCV000013144", "clinical_significance": "Likely benign"}
        }))?;
        assert_eq!(clinvar.significance().as_deref(), Some("Likely benign"));
        Ok(())
    }

    #[test]
    fn rcv_empty_missing_or_odd() -> Result<(), Report> {
        for value in [json!({"rcv": []}), json!({}), json!({"rcv": "n/a"}), json!({"rcv": null})] {
            let clinvar: ClinVar = serde_json::from_value(value)?;
            assert_eq!(clinvar.significance(), None);
        }
        Ok(())
    }

    #[test]
    fn significance_not_text() -> Result<(), Report> {
        let clinvar: ClinVar =
            serde_json::from_value(json!({"rcv": {"clinical_significance": ["Benign"]}}))?;
        assert_eq!(clinvar.significance(), None);
        Ok(())
    }

    #[test]
    fn coordinates() -> Result<(), Report> {
        let clinvar: ClinVar = serde_json::from_value(json!({
            "chrom": "17",
            "hg19": {"start": 7577120, "end": 7577120}
        }))?;
        assert_eq!(clinvar.chromosome().as_deref(), Some("17"));
        assert_eq!(clinvar.position(), Some(7577120));

        let clinvar: ClinVar = serde_json::from_value(json!({"chrom": 13}))?;
        assert_eq!(clinvar.chromosome().as_deref(), Some("13"));
        assert_eq!(clinvar.position(), None);
        Ok(())
    }

    #[test]
    fn odd_coordinates_keep_other_fields() -> Result<(), Report> {
        for hg19 in [json!("chr17:7577120"), json!(null), json!(42)] {
            let hit = Hit::from_value(json!({
                "_id": "chr17:g.7577120C>T",
                "clinvar": {"chrom": "17", "hg19": hg19, "rcv": {"clinical_significance": "Pathogenic"}}
            }));
            let clinvar = hit.clinvar().ok_or(color_eyre::eyre::eyre!("clinvar block dropped"))?;
            assert_eq!(clinvar.position(), None);
            assert_eq!(clinvar.chromosome().as_deref(), Some("17"));
            assert_eq!(clinvar.significance().as_deref(), Some("Pathogenic"));
        }

        let clinvar: ClinVar = serde_json::from_value(json!({"hg19": [{"start": "7577120"}]}))?;
        assert_eq!(clinvar.position(), Some(7577120));
        Ok(())
    }

    #[test]
    fn clinvar_list_uses_first() {
        let hit = Hit::from_value(json!({
            "_id": "chr7:g.117559590A>G",
            "clinvar": [{"chrom": "7"}, {"chrom": "X"}]
        }));
        let chrom = hit.clinvar().and_then(ClinVar::chromosome);
        assert_eq!(chrom.as_deref(), Some("7"));
    }

    #[test]
    fn response_without_hits() -> Result<(), Report> {
        let response: QueryResponse = serde_json::from_str(r#"{"took": 3, "total": 0}"#)?;
        assert_eq!(response.total, Some(0));
        assert!(response.hits.is_none());
        Ok(())
    }
}
