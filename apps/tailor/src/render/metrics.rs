//! Static glyph-width tables for the three type families used by the layout variants.
//!
//! Widths are thousandths of an em from the standard Helvetica (sans), Times (serif)
//! and Courier (monospace) metrics. Only printable ASCII 0x20..=0x7E is tabled;
//! `index = (char as usize) - 32`. Anything else measures as the family average.
//!
//! Line breaking is greedy on whitespace. It is an estimate of what a browser or PDF
//! engine will do, good enough for line counts and plain-text output.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    Sans,
    Serif,
    Mono,
}

impl FontFamily {
    pub fn metrics(self) -> &'static FontMetrics {
        match self {
            FontFamily::Sans => &SANS,
            FontFamily::Serif => &SERIF,
            FontFamily::Mono => &MONO,
        }
    }

    /// CSS font stack used by the HTML writer.
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Sans => "Helvetica, Arial, sans-serif",
            FontFamily::Serif => "Georgia, 'Times New Roman', serif",
            FontFamily::Mono => "'Courier New', Courier, monospace",
        }
    }
}

pub struct FontMetrics {
    widths: [u16; 95],
    average: u16,
}

impl FontMetrics {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        let milli = if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average
        };
        f32::from(milli) / 1000.0
    }

    /// Rendered width of `s` in em.
    pub fn measure(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    pub fn average_width(&self) -> f32 {
        f32::from(self.average) / 1000.0
    }

    /// Greedy word wrap at `width_em`. Words are never split or dropped; a word wider
    /// than the line gets a line of its own. Blank input yields no lines.
    pub fn wrap(&self, text: &str, width_em: f32) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        self.pack(&words, " ", width_em)
    }

    /// Packs whole tokens into lines, joining tokens on a line with `separator`.
    pub fn pack<S: AsRef<str>>(&self, tokens: &[S], separator: &str, width_em: f32) -> Vec<String> {
        let separator_width = self.measure(separator);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for token in tokens {
            let token = token.as_ref();
            let token_width = self.measure(token);
            if current.is_empty() {
                current.push_str(token);
                current_width = token_width;
            } else if current_width + separator_width + token_width > width_em {
                lines.push(std::mem::take(&mut current));
                current.push_str(token);
                current_width = token_width;
            } else {
                current.push_str(separator);
                current.push_str(token);
                current_width += separator_width + token_width;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Width tables
// ────────────────────────────────────────────────────────────────────────────

static SANS: FontMetrics = FontMetrics {
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :   ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A-M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N-Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [   \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a-m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n-z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {   |    }    ~
        334, 260, 334, 584,
    ],
    average: 530,
};

static SERIF: FontMetrics = FontMetrics {
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        // 0-9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :   ;    <    =    >    ?    @
        278, 278, 564, 564, 564, 444, 921,
        // A-M
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        // N-Z
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        // [   \    ]    ^    _    `
        333, 278, 333, 469, 500, 333,
        // a-m
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        // n-z
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        // {   |    }    ~
        480, 200, 480, 541,
    ],
    average: 470,
};

static MONO: FontMetrics = FontMetrics {
    widths: [600; 95],
    average: 600,
};
