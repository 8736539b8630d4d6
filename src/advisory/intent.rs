use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    HealthComplaint,
    WellnessInfo,
    Emergency,
    Unknown,
}

const HEALTH_KEYWORDS: [&str; 9] = [
    "pain",
    "hurt",
    "ache",
    "sick",
    "feel",
    "symptom",
    "temperature",
    "fever",
    "cough",
];
const WELLNESS_KEYWORDS: [&str; 2] = ["healthy", "wellness"];
const EMERGENCY_KEYWORDS: [&str; 2] = ["emergency", "urgent"];

pub const HEALTH_ACKNOWLEDGEMENTS: [&str; 4] = [
    "I understand you're concerned about your health. Can you describe your symptoms in more detail?",
    "Thank you for sharing that with me. While I can provide general information, it's important to consult with a healthcare professional for proper diagnosis and treatment.",
    "I'm here to help with general health information. Based on what you've shared, I recommend staying hydrated, getting rest, and monitoring your symptoms.",
    "Health concerns can be worrying. If your symptoms persist or worsen, please consider contacting a healthcare provider.",
];

pub const WELLNESS_RESPONSE: &str = "Maintaining good health involves regular exercise, balanced nutrition, adequate sleep, and regular check-ups with healthcare providers. Is there a specific aspect of health you'd like to know more about?";

pub const EMERGENCY_RESPONSE: &str = "If you're experiencing a medical emergency, please call emergency services immediately (911 in the US). For non-emergency health concerns, I'm here to provide general information and guidance.";

pub const FALLBACK_RESPONSE: &str = "I'm here to help with general health information and guidance. You can ask me about symptoms, general health advice, or describe how you're feeling. Remember, I provide general information only - always consult healthcare professionals for medical advice.";

/// Keyword precedence is health complaint, wellness, emergency, so
/// "urgent pain" is a complaint, not an emergency.
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|keyword| lower.contains(keyword));

    if mentions(&HEALTH_KEYWORDS) {
        Intent::HealthComplaint
    } else if mentions(&WELLNESS_KEYWORDS) {
        Intent::WellnessInfo
    } else if mentions(&EMERGENCY_KEYWORDS) {
        Intent::Emergency
    } else {
        Intent::Unknown
    }
}

/// Canned-reply assistant. The random source only picks among the health
/// acknowledgements and is injectable so replies can be pinned in tests.
pub struct IntentRouter {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl IntentRouter {
    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    pub fn respond(&self, text: &str) -> (Intent, String) {
        let intent = classify(text);
        let reply = match intent {
            Intent::HealthComplaint => self.pick_acknowledgement(),
            Intent::WellnessInfo => WELLNESS_RESPONSE,
            Intent::Emergency => EMERGENCY_RESPONSE,
            Intent::Unknown => FALLBACK_RESPONSE,
        };
        (intent, reply.to_string())
    }

    /// Async so a networked assistant can replace this without touching
    /// callers; completes immediately.
    pub async fn process_message(&self, text: &str) -> String {
        self.respond(text).1
    }

    fn pick_acknowledgement(&self) -> &'static str {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let index = rng.gen_range(0..HEALTH_ACKNOWLEDGEMENTS.len());
        HEALTH_ACKNOWLEDGEMENTS[index]
    }
}
