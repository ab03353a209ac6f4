//! Static font-metric tables for the template fonts.
//!
//! Character advances are stored in em units and scaled by the run's pixel size at
//! measurement time. Tables approximate the real fonts closely enough that a block's
//! wrapped line count matches the browser in all but borderline cases; the packer
//! only needs heights, and a one-line disagreement moves at most one block.
//!
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// USA template.
    Inter,
    /// India template.
    Roboto,
    /// Classic template.
    Georgia,
}

impl FontFamily {
    /// CSS `font-family` stack used by the renderer.
    pub fn css_stack(&self) -> &'static str {
        match self {
            FontFamily::Inter => "'Inter', 'Helvetica Neue', Arial, sans-serif",
            FontFamily::Roboto => "'Roboto', 'Helvetica Neue', Arial, sans-serif",
            FontFamily::Georgia => "Georgia, 'Times New Roman', serif",
        }
    }
}

/// Static character-width table for a font family.
///
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback advance for anything outside printable ASCII.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of a string in em units.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of a string in pixels at `size_px`.
    pub fn measure_px(&self, s: &str, size_px: f32) -> f32 {
        self.measure_em(s) * size_px
    }

    /// Greedy word-wrap at `max_width_px`, returning the width of each printed line.
    ///
    /// A word wider than the line sits alone on its own line and overflows it, the way
    /// a browser treats an unbreakable token. Empty or whitespace-only text yields no lines.
    pub fn wrap_px(&self, text: &str, size_px: f32, max_width_px: f32) -> Vec<f32> {
        let mut lines = Vec::new();
        let space_w = self.space_width * size_px;
        let mut current: Option<f32> = None;

        for word in text.split_whitespace() {
            let word_w = self.measure_px(word, size_px);
            current = match current {
                Some(w) if w + space_w + word_w > max_width_px => {
                    lines.push(w);
                    Some(word_w)
                }
                Some(w) => Some(w + space_w + word_w),
                None => Some(word_w),
            };
        }
        if let Some(w) = current {
            lines.push(w);
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static INTER_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.28, 0.29, 0.40, 0.63, 0.60, 0.86, 0.68, 0.22, 0.34, 0.34, 0.47, 0.62, 0.26, 0.40, 0.26, 0.36,
        // 0     1     2     3     4     5     6     7     8     9
        0.62, 0.43, 0.59, 0.61, 0.62, 0.59, 0.61, 0.54, 0.61, 0.61,
        // :     ;     <     =     >     ?     @
        0.26, 0.27, 0.62, 0.62, 0.62, 0.52, 0.96,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.70, 0.64, 0.71, 0.71, 0.58, 0.56, 0.73, 0.74, 0.27, 0.51, 0.65, 0.53, 0.88,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.74, 0.76, 0.62, 0.76, 0.64, 0.62, 0.62, 0.72, 0.70, 0.98, 0.66, 0.66, 0.62,
        // [     \     ]     ^     _     `
        0.34, 0.36, 0.34, 0.46, 0.50, 0.30,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.55, 0.59, 0.53, 0.59, 0.56, 0.35, 0.59, 0.57, 0.24, 0.24, 0.52, 0.24, 0.86,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.57, 0.57, 0.59, 0.59, 0.36, 0.50, 0.34, 0.57, 0.53, 0.78, 0.52, 0.53, 0.51,
        // {     |     }     ~
        0.36, 0.26, 0.36, 0.62,
    ],
    average_char_width: 0.56,
    space_width: 0.28,
};

static ROBOTO_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.26, 0.32, 0.62, 0.56, 0.73, 0.62, 0.17, 0.34, 0.35, 0.43, 0.57, 0.20, 0.28, 0.26, 0.41,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.24, 0.21, 0.51, 0.55, 0.52, 0.47, 0.90,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.65, 0.62, 0.65, 0.66, 0.57, 0.55, 0.68, 0.71, 0.27, 0.55, 0.63, 0.54, 0.87,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.71, 0.69, 0.63, 0.69, 0.62, 0.59, 0.60, 0.65, 0.64, 0.89, 0.63, 0.60, 0.60,
        // [     \     ]     ^     _     `
        0.27, 0.41, 0.27, 0.42, 0.45, 0.31,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.54, 0.56, 0.52, 0.56, 0.53, 0.35, 0.56, 0.55, 0.24, 0.24, 0.51, 0.24, 0.88,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.55, 0.57, 0.56, 0.57, 0.34, 0.52, 0.33, 0.55, 0.48, 0.75, 0.50, 0.47, 0.50,
        // {     |     }     ~
        0.34, 0.24, 0.34, 0.68,
    ],
    average_char_width: 0.53,
    space_width: 0.25,
};

static GEORGIA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.24, 0.33, 0.41, 0.73, 0.55, 0.84, 0.71, 0.22, 0.37, 0.37, 0.48, 0.73, 0.27, 0.37, 0.27, 0.46,
        // 0     1     2     3     4     5     6     7     8     9
        0.61, 0.43, 0.56, 0.56, 0.58, 0.55, 0.58, 0.51, 0.61, 0.58,
        // :     ;     <     =     >     ?     @
        0.31, 0.31, 0.73, 0.73, 0.73, 0.47, 0.93,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.65, 0.64, 0.74, 0.65, 0.60, 0.73, 0.82, 0.39, 0.52, 0.71, 0.60, 0.93,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.77, 0.74, 0.61, 0.74, 0.70, 0.56, 0.62, 0.75, 0.67, 0.99, 0.71, 0.62, 0.60,
        // [     \     ]     ^     _     `
        0.37, 0.46, 0.37, 0.73, 0.73, 0.46,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.50, 0.56, 0.46, 0.57, 0.48, 0.32, 0.50, 0.58, 0.29, 0.27, 0.52, 0.28, 0.87,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.58, 0.54, 0.56, 0.55, 0.41, 0.43, 0.33, 0.58, 0.49, 0.74, 0.50, 0.49, 0.45,
        // {     |     }     ~
        0.41, 0.38, 0.41, 0.73,
    ],
    average_char_width: 0.55,
    space_width: 0.24,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Inter => &INTER_TABLE,
        FontFamily::Roboto => &ROBOTO_TABLE,
        FontFamily::Georgia => &GEORGIA_TABLE,
    }
}
