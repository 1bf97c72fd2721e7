//! Fixed localized phrases and voice identities
//!
//! Canned responses the orchestrator emits without consulting a provider:
//! the first-contact greeting, the short re-greeting, and the apology used
//! when generation is fully exhausted. Voice names map each language to a
//! preconfigured synthesis voice.

use agrivoice_core::Language;

/// Normalized greeting words that trigger the fixed-greeting shortcut
pub const GREETING_WORDS: &[&str] = &[
    "hi", "hii", "hiii", "hello", "hey", "namaste", "namaskara", "नमस्ते", "ನಮಸ್ಕಾರ",
];

/// Full greeting for the first assistant turn
pub fn greeting(language: Language) -> &'static str {
    match language {
        Language::English => {
            "Hello! I am your farming assistant. I can help you with weather updates, \
             crop recommendations, market prices, government schemes, and more. \
             How can I help you today?"
        }
        Language::Hindi => {
            "नमस्ते! मैं आपका खेती सहायक हूं। मैं आपको मौसम, फसल सिफारिशें, मंडी भाव, \
             सरकारी योजनाएं और भी बहुत कुछ में मदद कर सकता हूं। आज मैं आपकी कैसे मदद कर सकता हूं?"
        }
        Language::Kannada => {
            "ನಮಸ್ಕಾರ! ನಾನು ನಿಮ್ಮ ಕೃಷಿ ಸಹಾಯಕ. ನಾನು ಹವಾಮಾನ, ಬೆಳೆ ಶಿಫಾರಸುಗಳು, ಮಾರುಕಟ್ಟೆ ಬೆಲೆಗಳು, \
             ಸರ್ಕಾರಿ ಯೋಜನೆಗಳು ಮತ್ತು ಇನ್ನೂ ಹೆಚ್ಚಿನ ವಿಷಯಗಳಲ್ಲಿ ನಿಮಗೆ ಸಹಾಯ ಮಾಡಬಹುದು. \
             ಇಂದು ನಾನು ನಿಮಗೆ ಹೇಗೆ ಸಹಾಯ ಮಾಡಬಹುದು?"
        }
    }
}

/// Short re-greeting used when the user greets again mid-conversation
pub fn regreeting(language: Language) -> &'static str {
    match language {
        Language::English => "Hello! How can I help you today?",
        Language::Hindi => "नमस्ते! आज मैं आपकी कैसे मदद कर सकता हूं?",
        Language::Kannada => "ನಮಸ್ಕಾರ! ಇಂದು ನಾನು ನಿಮಗೆ ಹೇಗೆ ಸಹಾಯ ಮಾಡಬಹುದು?",
    }
}

/// Apology standing in for the assistant turn when every provider failed
pub fn apology(language: Language) -> &'static str {
    match language {
        Language::English => {
            "I apologize, I'm having trouble responding right now. Please try again in a few moments."
        }
        Language::Hindi => {
            "माफ़ कीजिए, अभी मुझे जवाब देने में समस्या हो रही है। कृपया कुछ देर बाद दोबारा कोशिश करें।"
        }
        Language::Kannada => {
            "ಕ್ಷಮಿಸಿ, ಈಗ ನನಗೆ ಉತ್ತರಿಸಲು ಸಮಸ್ಯೆಯಾಗುತ್ತಿದೆ. ದಯವಿಟ್ಟು ಸ್ವಲ್ಪ ಸಮಯದ ನಂತರ ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ."
        }
    }
}

/// Farewell phrase
pub fn farewell(language: Language) -> &'static str {
    match language {
        Language::English => "Thank you for visiting. Happy farming!",
        Language::Hindi => "धन्यवाद। खुशहाल खेती!",
        Language::Kannada => "ಧನ್ಯವಾದಗಳು. ಸಂತೋಷದ ಕೃಷಿ!",
    }
}

/// Preconfigured synthesis voice per language
pub fn voice_name(language: Language) -> &'static str {
    match language {
        Language::English => "Kore",
        // Aoede handles both Indic scripts well
        Language::Hindi | Language::Kannada => "Aoede",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_assets() {
        for lang in Language::all() {
            assert!(!greeting(lang).is_empty());
            assert!(!regreeting(lang).is_empty());
            assert!(!apology(lang).is_empty());
            assert!(!farewell(lang).is_empty());
            assert!(!voice_name(lang).is_empty());
        }
    }

    #[test]
    fn regreeting_is_shorter_than_greeting() {
        for lang in Language::all() {
            assert!(regreeting(lang).len() < greeting(lang).len());
        }
    }
}
