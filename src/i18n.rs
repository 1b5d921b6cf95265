use axum::http::HeaderMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Id,
    En,
}

impl Locale {
    /// Parses a language tag such as `en`, `en-US` or `id-ID`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_', ';'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "id" | "in" => Some(Locale::Id),
            _ => None,
        }
    }

    /// First supported language in `Accept-Language`, else Indonesian
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(axum::http::header::ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').find_map(Locale::from_tag))
            .unwrap_or_default()
    }
}

/// User-facing strings of the mentor chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    InvalidRequest,
    EmptyMessage,
    MessageTooLong,
    RateLimited,
    SystemBusy,
    Maintenance,
    SystemIssue,
    Generic,
}

impl Text {
    pub fn render(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Text::InvalidRequest, Locale::Id) => {
                "Maaf, permintaanmu tidak bisa dibaca. Coba kirim ulang ya."
            }
            (Text::InvalidRequest, Locale::En) => {
                "Sorry, I couldn't read that request. Please try sending it again."
            }
            (Text::EmptyMessage, Locale::Id) => "Tulis dulu pertanyaanmu, ya.",
            (Text::EmptyMessage, Locale::En) => "Please write your question first.",
            (Text::MessageTooLong, Locale::Id) => {
                "Pesanmu terlalu panjang. Coba persingkat menjadi maksimal 1000 karakter."
            }
            (Text::MessageTooLong, Locale::En) => {
                "Your message is too long. Please keep it under 1000 characters."
            }
            (Text::RateLimited, Locale::Id) => {
                "Kamu mengirim pesan terlalu cepat. Istirahat sejenak, lalu coba lagi dalam {seconds} detik."
            }
            (Text::RateLimited, Locale::En) => {
                "You're sending messages too quickly. Take a short pause and try again in {seconds} seconds."
            }
            (Text::SystemBusy, Locale::Id) => {
                "Mentor sedang sibuk melayani banyak pengguna. Coba lagi sebentar lagi, ya."
            }
            (Text::SystemBusy, Locale::En) => {
                "The mentor is busy helping many people right now. Please try again shortly."
            }
            (Text::Maintenance, Locale::Id) => {
                "Mentor sedang dalam pemeliharaan. Silakan coba lagi nanti."
            }
            (Text::Maintenance, Locale::En) => {
                "The mentor is under maintenance. Please try again later."
            }
            (Text::SystemIssue, Locale::Id) => {
                "Ada kendala sistem di pihak kami dan tim sedang menanganinya. Mohon maaf atas ketidaknyamanannya."
            }
            (Text::SystemIssue, Locale::En) => {
                "We're having a system issue and the team is on it. Sorry for the inconvenience."
            }
            (Text::Generic, Locale::Id) => "Maaf, terjadi kesalahan. Silakan coba lagi.",
            (Text::Generic, Locale::En) => "Sorry, something went wrong. Please try again.",
        }
    }
}
