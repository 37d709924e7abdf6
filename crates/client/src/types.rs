use codec::{
    expand_to_binary_string, sparsity_percent, CodecError, Fingerprint, FingerprintBitmap,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fingerprint with its grid dimensions and derived sparsity.
///
/// This is the one shape every fingerprint-producing operation returns:
///
/// ```json
/// {
///   "subjectText": "owl",
///   "width": 128,
///   "height": 128,
///   "sparsity": 3.0,
///   "fingerprint": { "positions": [12, 40, 977] },
///   "extra": { "score": 0.0, "pos_types": ["NOUN"], "df": 0.0001 },
///   "placeholder": false
/// }
/// ```
///
/// Fields are read-only so `sparsity` always matches the bitmap. Decoding
/// ignores any serialized `sparsity`, derives it again, and rejects bitmaps
/// that do not fit the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFingerprintInfo")]
pub struct FingerprintInfo {
    subject_text: String,
    width: u32,
    height: u32,
    sparsity: f64,
    fingerprint: Fingerprint,
    extra: Map<String, Value>,
    placeholder: bool,
}

impl FingerprintInfo {
    /// Builds the info and derives sparsity from the bitmap size.
    pub fn new(
        subject_text: impl Into<String>,
        width: u32,
        height: u32,
        bitmap: FingerprintBitmap,
        extra: Map<String, Value>,
        placeholder: bool,
    ) -> Self {
        let sparsity = sparsity_percent(bitmap.len(), width, height);
        Self {
            subject_text: subject_text.into(),
            width,
            height,
            sparsity,
            fingerprint: Fingerprint::from(bitmap),
            extra,
            placeholder,
        }
    }

    /// Term, text, or category name the fingerprint encodes.
    pub fn subject_text(&self) -> &str {
        &self.subject_text
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `round(100 * on_bits / (width * height))`.
    pub fn sparsity(&self) -> f64 {
        self.sparsity
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn bitmap(&self) -> &FingerprintBitmap {
        &self.fingerprint.positions
    }

    /// Service fields not modelled above (score, part-of-speech tags, ...).
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// True when the bitmap was generated locally because the service had none.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Dense `'0'`/`'1'` rendering over this fingerprint's grid.
    pub fn to_binary_string(&self) -> Result<String, CodecError> {
        expand_to_binary_string(self.bitmap(), self.width, self.height)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFingerprintInfo {
    subject_text: String,
    width: u32,
    height: u32,
    fingerprint: Fingerprint,
    #[serde(default)]
    extra: Map<String, Value>,
    #[serde(default)]
    placeholder: bool,
}

impl TryFrom<RawFingerprintInfo> for FingerprintInfo {
    type Error = CodecError;

    fn try_from(raw: RawFingerprintInfo) -> Result<Self, Self::Error> {
        let cells = raw.width as usize * raw.height as usize;
        raw.fingerprint.positions.validate(cells)?;
        Ok(Self::new(
            raw.subject_text,
            raw.width,
            raw.height,
            raw.fingerprint.positions,
            raw.extra,
            raw.placeholder,
        ))
    }
}

/// Distance and overlap metrics between two bitmaps, as computed by the service.
///
/// Older service versions used hyphenated keys (`Cosine-Similarity`); those are
/// accepted and renamed to the camelCase form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    #[serde(alias = "Cosine-Similarity")]
    pub cosine_similarity: f64,
    #[serde(alias = "Euclidean-Distance")]
    pub euclidean_distance: f64,
    #[serde(alias = "Jaccard-Distance")]
    pub jaccard_distance: f64,
    #[serde(alias = "Overlapping-all")]
    pub overlapping_all: u64,
    #[serde(alias = "Overlapping-left-right")]
    pub overlapping_left_right: f64,
    #[serde(alias = "Overlapping-right-left")]
    pub overlapping_right_left: f64,
    #[serde(alias = "Size-left")]
    pub size_left: u64,
    #[serde(alias = "Size-right")]
    pub size_right: u64,
    #[serde(alias = "Weighted-Scoring")]
    pub weighted_scoring: f64,
}

/// A term close to a queried bitmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTerm {
    pub term: String,
    #[serde(default)]
    pub score: f64,
}

/// One sense of a term, with the fingerprint for that sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermContext {
    pub context_label: String,
    pub context_id: u32,
    #[serde(default)]
    pub fingerprint: Fingerprint,
}

/// Raw fingerprint fields pulled out of a service object.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ServiceFingerprint {
    pub positions: Vec<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub extra: Map<String, Value>,
}

/// Keys consumed by [`ServiceFingerprint::from_object`]; everything else is `extra`.
const CONSUMED_KEYS: &[&str] = &[
    "term",
    "text",
    "width",
    "height",
    "sparsity",
    "fingerprint",
    "positions",
];

impl ServiceFingerprint {
    /// Reads positions from `fingerprint.positions`, or from a top-level
    /// `positions` as older responses sent them. `None` when neither holds a
    /// list of non-negative integers.
    pub fn from_object(mut object: Map<String, Value>) -> Option<Self> {
        let nested = match object.get("fingerprint") {
            Some(Value::Object(inner)) => inner.get("positions").cloned(),
            _ => None,
        };
        let raw_positions = nested.or_else(|| object.get("positions").cloned())?;
        let positions: Vec<u32> = serde_json::from_value(raw_positions).ok()?;

        let width = dimension(&object, "width");
        let height = dimension(&object, "height");
        for key in CONSUMED_KEYS {
            object.remove(*key);
        }

        Some(Self {
            positions,
            width,
            height,
            extra: object,
        })
    }
}

fn dimension(object: &Map<String, Value>, key: &str) -> Option<u32> {
    object
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn info_derives_sparsity() {
        let info = FingerprintInfo::new(
            "owl",
            4,
            4,
            FingerprintBitmap::from_positions(vec![0, 13]),
            Map::new(),
            false,
        );
        assert_eq!(info.sparsity(), 13.0);
        assert_eq!(info.bitmap().positions(), &[0, 13]);
        assert_eq!(info.to_binary_string().unwrap(), "1000000000000100");
    }

    #[test]
    fn info_serializes_nested_positions() {
        let info = FingerprintInfo::new(
            "owl",
            4,
            4,
            FingerprintBitmap::from_positions(vec![1]),
            Map::new(),
            true,
        );
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["subjectText"], "owl");
        assert_eq!(value["fingerprint"]["positions"], json!([1]));
        assert_eq!(value["placeholder"], true);

        let back: FingerprintInfo = serde_json::from_value(value).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn decoding_rederives_sparsity() {
        let info: FingerprintInfo = serde_json::from_value(json!({
            "subjectText": "owl",
            "width": 4,
            "height": 4,
            "sparsity": 99.0,
            "fingerprint": {"positions": [0, 13]}
        }))
        .unwrap();
        assert_eq!(info.sparsity(), 13.0);
        assert!(!info.is_placeholder());
        assert!(info.extra().is_empty());
    }

    #[test]
    fn decoding_rejects_bitmap_outside_grid() {
        let result = serde_json::from_value::<FingerprintInfo>(json!({
            "subjectText": "owl",
            "width": 4,
            "height": 4,
            "fingerprint": {"positions": [16]}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn comparison_reads_camel_case() {
        let result: ComparisonResult = serde_json::from_value(json!({
            "cosineSimilarity": 1.0,
            "euclideanDistance": 0.0,
            "jaccardDistance": 0.0,
            "overlappingAll": 2,
            "overlappingLeftRight": 1.0,
            "overlappingRightLeft": 1.0,
            "sizeLeft": 2,
            "sizeRight": 2,
            "weightedScoring": 1.0
        }))
        .unwrap();
        assert_eq!(result.overlapping_all, 2);
        assert_eq!(result.euclidean_distance, 0.0);
    }

    #[test]
    fn comparison_renames_legacy_keys() {
        let result: ComparisonResult = serde_json::from_value(json!({
            "Cosine-Similarity": 0.6666666666666666,
            "Euclidean-Distance": 0.3333333333333333,
            "Jaccard-Distance": 0.5,
            "Overlapping-all": 6,
            "Overlapping-left-right": 0.6666666666666666,
            "Overlapping-right-left": 0.6666666666666666,
            "Size-left": 9,
            "Size-right": 9,
            "Weighted-Scoring": 0.4436476984102028
        }))
        .unwrap();
        assert_eq!(result.overlapping_all, 6);
        assert_eq!(result.size_left, 9);

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("jaccardDistance").is_some());
        assert!(value.get("Jaccard-Distance").is_none());
    }

    #[test]
    fn service_fingerprint_nested_shape() {
        let raw = object(json!({
            "term": "owl",
            "df": 0.0001,
            "score": 0.0,
            "pos_types": ["NOUN"],
            "fingerprint": {"positions": [40, 12]}
        }));
        let fp = ServiceFingerprint::from_object(raw).unwrap();
        assert_eq!(fp.positions, vec![40, 12]);
        assert_eq!(fp.width, None);
        assert!(fp.extra.contains_key("pos_types"));
        assert!(!fp.extra.contains_key("term"));
        assert!(!fp.extra.contains_key("fingerprint"));
    }

    #[test]
    fn service_fingerprint_flat_shape_with_dimensions() {
        let raw = object(json!({"positions": [1, 2], "width": 64, "height": 32}));
        let fp = ServiceFingerprint::from_object(raw).unwrap();
        assert_eq!(fp.positions, vec![1, 2]);
        assert_eq!((fp.width, fp.height), (Some(64), Some(32)));
        assert!(fp.extra.is_empty());
    }

    #[test]
    fn service_fingerprint_requires_positions() {
        assert!(ServiceFingerprint::from_object(object(json!({"term": "owl"}))).is_none());
        assert!(ServiceFingerprint::from_object(object(json!({"positions": [-1]}))).is_none());
        assert!(ServiceFingerprint::from_object(object(json!({"positions": "1,2"}))).is_none());
    }

    #[test]
    fn context_and_similar_term_decode() {
        let ctx: TermContext = serde_json::from_value(json!({
            "context_label": "robot",
            "context_id": 0,
            "fingerprint": {"positions": [3, 1]}
        }))
        .unwrap();
        assert_eq!(ctx.context_id, 0);
        assert_eq!(ctx.fingerprint.positions.positions(), &[1, 3]);

        let term: SimilarTerm =
            serde_json::from_value(json!({"term": "bird", "score": 12.5, "df": 0.1})).unwrap();
        assert_eq!(term.term, "bird");
        assert_eq!(term.score, 12.5);
    }
}
