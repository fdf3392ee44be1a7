/// Declarative metric table for the result-sheet scanner.
///
/// Each row names the anchor label printed on the sheet, the unit token
/// expected right after it, how far to look for the value, and the range a
/// value must fall in to be believed.
use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Weight,
    MuscleMass,
    FatMass,
    Bmi,
    BodyFatPercentage,
    BasalMetabolicRate,
    BodyWater,
    Protein,
    LeanBodyMass,
    VisceralFatLevel,
    WaistHipRatio,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Weight => "weight",
            Metric::MuscleMass => "muscleMass",
            Metric::FatMass => "fatMass",
            Metric::Bmi => "bmi",
            Metric::BodyFatPercentage => "bodyFatPercentage",
            Metric::BasalMetabolicRate => "basalMetabolicRate",
            Metric::BodyWater => "bodyWater",
            Metric::Protein => "protein",
            Metric::LeanBodyMass => "leanBodyMass",
            Metric::VisceralFatLevel => "visceralFatLevel",
            Metric::WaistHipRatio => "waistHipRatio",
        }
    }
}

/// Open interval `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibleRange {
    pub min: f64,
    pub max: f64,
}

impl PlausibleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }
}

/// Shape a value token must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePattern {
    /// Number at the start of the token; trailing text is ignored (`"70.5kg"`).
    LeadingDecimal,
    /// The whole token is an integer.
    Integer,
    /// A number followed by `kg` anywhere in the token.
    KgSuffixed,
    /// The whole token is `0.<digits>`.
    Fraction,
}

static LEADING_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.?\d*)").expect("valid regex"));
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)$").expect("valid regex"));
static KG_SUFFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)kg").expect("valid regex"));
static FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0\.\d+)$").expect("valid regex"));

impl ValuePattern {
    fn regex(&self) -> &'static Regex {
        match self {
            ValuePattern::LeadingDecimal => &LEADING_DECIMAL,
            ValuePattern::Integer => &INTEGER,
            ValuePattern::KgSuffixed => &KG_SUFFIXED,
            ValuePattern::Fraction => &FRACTION,
        }
    }

    /// Pull the numeric value out of `text`, or `None` when the token does
    /// not have this shape or the captured digits fail to parse.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let caps = self.regex().captures(text)?;
        caps.get(1)?.as_str().parse::<f64>().ok()
    }
}

/// Unit token that must follow the anchor within `window` tokens.
#[derive(Debug, Clone, Copy)]
pub struct UnitRule {
    pub text: &'static str,
    pub window: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    pub metric: Metric,
    pub anchors: &'static [&'static str],
    pub unit: Option<UnitRule>,
    /// Tokens `origin+1 .. origin+lookahead` are scanned.
    pub lookahead: usize,
    pub range: PlausibleRange,
    pub pattern: ValuePattern,
    /// Scale labels and baselines printed between anchor and value.
    pub skip_texts: &'static [&'static str],
    /// Values are only accepted once this token has been passed.
    pub gate: Option<&'static str>,
    pub round: bool,
}

const KG: Option<UnitRule> = Some(UnitRule {
    text: "(kg)",
    window: 1,
});

const SCALE_LABELS: &[&str] = &["높음", "낮음", "표준"];

pub static METRICS: &[MetricSpec] = &[
    MetricSpec {
        metric: Metric::Weight,
        anchors: &["체중"],
        unit: KG,
        lookahead: 3,
        range: PlausibleRange::new(20.0, 300.0),
        pattern: ValuePattern::LeadingDecimal,
        skip_texts: &[],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::MuscleMass,
        anchors: &["골격근량"],
        unit: Some(UnitRule {
            text: "(kg)",
            window: 9,
        }),
        lookahead: 3,
        range: PlausibleRange::new(5.0, 50.0),
        pattern: ValuePattern::LeadingDecimal,
        skip_texts: &[],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::FatMass,
        anchors: &["체지방량"],
        unit: KG,
        lookahead: 3,
        range: PlausibleRange::new(0.0, 200.0),
        pattern: ValuePattern::LeadingDecimal,
        skip_texts: &[],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::Bmi,
        anchors: &["BMI", "(kg/m2)"],
        unit: None,
        lookahead: 5,
        range: PlausibleRange::new(10.0, 60.0),
        pattern: ValuePattern::LeadingDecimal,
        skip_texts: &[],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::BodyFatPercentage,
        anchors: &["연구항목", "Body Fa"],
        unit: None,
        lookahead: 5,
        range: PlausibleRange::new(0.0, 100.0),
        pattern: ValuePattern::LeadingDecimal,
        skip_texts: &[],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::BasalMetabolicRate,
        anchors: &["기초대사량"],
        unit: None,
        lookahead: 3,
        range: PlausibleRange::new(500.0, 5000.0),
        pattern: ValuePattern::LeadingDecimal,
        skip_texts: &[],
        gate: None,
        round: true,
    },
    MetricSpec {
        metric: Metric::BodyWater,
        anchors: &["체수분"],
        unit: Some(UnitRule {
            text: "(L)",
            window: 1,
        }),
        lookahead: 3,
        range: PlausibleRange::new(10.0, 100.0),
        pattern: ValuePattern::LeadingDecimal,
        skip_texts: &[],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::Protein,
        anchors: &["단백질"],
        unit: KG,
        lookahead: 3,
        range: PlausibleRange::new(3.0, 30.0),
        pattern: ValuePattern::LeadingDecimal,
        skip_texts: &[],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::LeanBodyMass,
        anchors: &["제지방량"],
        unit: None,
        lookahead: 3,
        range: PlausibleRange::new(5.0, 250.0),
        pattern: ValuePattern::KgSuffixed,
        skip_texts: &[],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::VisceralFatLevel,
        anchors: &["내장지방레벨"],
        unit: None,
        lookahead: 25,
        range: PlausibleRange::new(10.0, 30.0),
        pattern: ValuePattern::Integer,
        // "10" is the printed baseline, not a reading
        skip_texts: &["10", "높음", "낮음", "표준"],
        gate: None,
        round: false,
    },
    MetricSpec {
        metric: Metric::WaistHipRatio,
        anchors: &["복부지방률"],
        unit: None,
        lookahead: 10,
        range: PlausibleRange::new(0.9, 1.0),
        pattern: ValuePattern::Fraction,
        skip_texts: SCALE_LABELS,
        gate: Some("높음"),
        round: false,
    },
];

/// Height is read from anywhere on the sheet as a `<number>cm` token.
pub const HEIGHT_RANGE: PlausibleRange = PlausibleRange::new(100.0, 250.0);

static HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.?\d*)cm$").expect("valid regex"));

pub fn parse_height(text: &str) -> Option<f64> {
    let caps = HEIGHT.captures(text)?;
    caps.get(1)?.as_str().parse::<f64>().ok()
}

pub fn spec_for(metric: Metric) -> Option<&'static MetricSpec> {
    METRICS.iter().find(|s| s.metric == metric)
}
