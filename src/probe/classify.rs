//! Registry page classification
//!
//! Pure mapping from the HTML of a search result page to an
//! `AvailabilitySignal`. A page without the "no records" phrase is only
//! called occupied when it also looks like a genuine result page.

use crate::cli::config::ProbeConfig;
use crate::types::AvailabilitySignal;
use scraper::{Html, Node};

/// Elements whose text never renders
const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "title"];

/// Lowercase and collapse runs of whitespace
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Rendered text of a document, whitespace-compacted
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map(|e| HIDDEN_ELEMENTS.contains(&e.name()))
                .unwrap_or(false)
        });
        if !hidden {
            pieces.push(&**text);
        }
    }

    pieces
        .iter()
        .flat_map(|p| p.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classifies result pages
#[derive(Debug, Clone)]
pub struct PageClassifier {
    no_records_marker: String,
    anomaly_markers: Vec<String>,
    challenge_markers: Vec<String>,
    occupied_markers: Vec<String>,
    min_visible_chars: usize,
}

impl PageClassifier {
    /// Create classifier with only the no-records marker
    pub fn new(no_records_marker: &str) -> Self {
        Self {
            no_records_marker: normalize(no_records_marker),
            anomaly_markers: Vec::new(),
            challenge_markers: Vec::new(),
            occupied_markers: Vec::new(),
            min_visible_chars: 0,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(&config.no_records_marker)
            .with_anomaly_markers(&config.anomaly_markers)
            .with_challenge_markers(&config.challenge_markers)
            .with_occupied_markers(&config.occupied_markers)
            .with_min_visible_chars(config.min_visible_chars)
    }

    pub fn with_anomaly_markers(mut self, markers: &[String]) -> Self {
        self.anomaly_markers = markers.iter().map(|m| normalize(m)).filter(|m| !m.is_empty()).collect();
        self
    }

    pub fn with_challenge_markers(mut self, markers: &[String]) -> Self {
        self.challenge_markers = markers.iter().map(|m| normalize(m)).filter(|m| !m.is_empty()).collect();
        self
    }

    pub fn with_occupied_markers(mut self, markers: &[String]) -> Self {
        self.occupied_markers = markers.iter().map(|m| normalize(m)).filter(|m| !m.is_empty()).collect();
        self
    }

    pub fn with_min_visible_chars(mut self, min: usize) -> Self {
        self.min_visible_chars = min;
        self
    }

    /// Classify a result page
    pub fn classify(&self, html: &str) -> AvailabilitySignal {
        // The no-records message may only exist in a script payload or the title
        let raw = normalize(html);
        let text = normalize(&visible_text(html));

        if text.contains(&self.no_records_marker) || raw.contains(&self.no_records_marker) {
            return AvailabilitySignal::Available;
        }

        if text.chars().count() < self.min_visible_chars {
            return AvailabilitySignal::Ambiguous;
        }

        if self.anomaly_markers.iter().any(|m| text.contains(m.as_str())) {
            return AvailabilitySignal::Ambiguous;
        }

        if self.challenge_markers.iter().any(|m| raw.contains(m.as_str())) {
            return AvailabilitySignal::Ambiguous;
        }

        if !self.occupied_markers.is_empty()
            && !self.occupied_markers.iter().any(|m| text.contains(m.as_str()))
        {
            return AvailabilitySignal::Ambiguous;
        }

        AvailabilitySignal::Occupied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!(
            "<html><head><title>Marcanet</title><script>var vista = 'bsqDenominacion';</script></head><body>{}</body></html>",
            body
        )
    }

    fn results_table() -> String {
        let rows: String = (0..10)
            .map(|i| format!("<tr><td>{}</td><td>ZYRQON</td><td>Registro vigente, clase 9</td></tr>", 1_000_000 + i))
            .collect();
        page(&format!("<table><tr><th>Expediente</th><th>Denominación</th><th>Estado</th></tr>{}</table>", rows))
    }

    fn classifier() -> PageClassifier {
        PageClassifier::from_config(&ProbeConfig::default())
    }

    #[test]
    fn test_marker_means_available() {
        let html = page("<div class='msg'>  No   se encontraron\n registros </div>");
        assert_eq!(classifier().classify(&html), AvailabilitySignal::Available);
    }

    #[test]
    fn test_marker_case_insensitive() {
        let html = page("<p>NO SE ENCONTRARON REGISTROS</p>");
        assert_eq!(classifier().classify(&html), AvailabilitySignal::Available);
    }

    #[test]
    fn test_marker_in_script_means_available() {
        let body = format!(
            "<p>{}</p><script>PrimeFaces.cw('Growl','msgs',{{msgs:[{{summary:'No se encontraron registros',severity:'info'}}]}});</script>",
            "Consulta de denominaciones en el acervo marcario. ".repeat(6)
        );
        assert_eq!(classifier().classify(&page(&body)), AvailabilitySignal::Available);
    }

    #[test]
    fn test_marker_in_title_means_available() {
        let html = format!(
            "<html><head><title>No se encontraron registros</title></head><body><p>{}</p></body></html>",
            "Consulta de denominaciones en el acervo marcario. ".repeat(6)
        );
        assert_eq!(classifier().classify(&html), AvailabilitySignal::Available);
    }

    #[test]
    fn test_results_page_loading_recaptcha_library_is_occupied() {
        let html = results_table().replace(
            "<head>",
            "<head><script src='https://www.google.com/recaptcha/api.js' async defer></script>",
        );
        assert_eq!(classifier().classify(&html), AvailabilitySignal::Occupied);
    }

    #[test]
    fn test_challenge_widget_is_ambiguous() {
        let body = format!(
            "<div class='g-recaptcha' data-sitekey='abc'></div><p>{}</p>",
            "Consulta de denominaciones en el acervo marcario. ".repeat(6)
        );
        assert_eq!(classifier().classify(&page(&body)), AvailabilitySignal::Ambiguous);
    }

    #[test]
    fn test_results_page_is_occupied() {
        assert_eq!(classifier().classify(&results_table()), AvailabilitySignal::Occupied);
    }

    #[test]
    fn test_captcha_text_is_ambiguous() {
        let body = format!(
            "<p>Resuelva el CAPTCHA para continuar.</p><p>{}</p>",
            "Por favor confirme que no es un robot. ".repeat(10)
        );
        assert_eq!(classifier().classify(&page(&body)), AvailabilitySignal::Ambiguous);
    }

    #[test]
    fn test_short_page_is_ambiguous() {
        assert_eq!(classifier().classify(&page("<p>Error</p>")), AvailabilitySignal::Ambiguous);
        assert_eq!(classifier().classify(""), AvailabilitySignal::Ambiguous);
    }

    #[test]
    fn test_occupied_markers_required_when_configured() {
        let classifier = classifier().with_occupied_markers(&["Expediente".to_string()]);
        assert_eq!(classifier.classify(&results_table()), AvailabilitySignal::Occupied);

        let other = page(&"Bienvenido al sistema de consulta. ".repeat(20));
        assert_eq!(classifier.classify(&other), AvailabilitySignal::Ambiguous);
    }

    #[test]
    fn test_bare_classifier_matches_legacy_rule() {
        let legacy = PageClassifier::new("No se encontraron registros");
        assert_eq!(legacy.classify(&page("<p>Error</p>")), AvailabilitySignal::Occupied);
        assert_eq!(
            legacy.classify(&page("<p>No se encontraron registros</p>")),
            AvailabilitySignal::Available
        );
    }

    #[test]
    fn test_visible_text_skips_hidden() {
        let text = visible_text("<html><head><style>p{}</style></head><body><p>uno</p>\n<p>dos</p><script>tres()</script></body></html>");
        assert_eq!(text, "uno dos");
    }
}
