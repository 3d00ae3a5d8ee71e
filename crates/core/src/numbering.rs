//! Page-number labels
//!
//! A numbering instruction is committed over a scope like any other page
//! operation; each target page gets one label text plus a position.

use crate::document::PageRef;
use serde::{Deserialize, Serialize};

/// Numeral style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// 1, 2, 3
    #[default]
    Arabic,
    /// i, ii, iii
    RomanLower,
    /// I, II, III
    RomanUpper,
    /// a, b, c … z, aa
    AlphabeticLower,
    /// A, B, C … Z, AA
    AlphabeticUpper,
}

impl NumberFormat {
    /// Format `number`; zero has no Roman or alphabetic form and renders empty
    pub fn format(self, number: u32) -> String {
        match self {
            NumberFormat::Arabic => number.to_string(),
            NumberFormat::RomanLower => to_roman(number).to_lowercase(),
            NumberFormat::RomanUpper => to_roman(number),
            NumberFormat::AlphabeticLower => to_alphabetic(number).to_lowercase(),
            NumberFormat::AlphabeticUpper => to_alphabetic(number),
        }
    }
}

/// Where the label sits on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberPosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
}

/// Numbering instruction as configured in the settings panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumbering {
    pub format: NumberFormat,
    pub position: NumberPosition,
    /// Number printed on `start_from_page`
    pub starting_number: u32,
    /// First page (1-based) that receives a label
    pub start_from_page: u32,
    pub prefix: String,
    pub suffix: String,
}

impl Default for PageNumbering {
    fn default() -> Self {
        Self {
            format: NumberFormat::Arabic,
            position: NumberPosition::BottomCenter,
            starting_number: 1,
            start_from_page: 1,
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl PageNumbering {
    /// Label for a page, `None` for pages before `start_from_page`
    pub fn label_for(&self, page: PageRef) -> Option<PageLabel> {
        let first = self.start_from_page.max(1);
        if page.page_number < first {
            return None;
        }
        let number = self.starting_number.saturating_add(page.page_number - first);
        Some(PageLabel {
            page,
            text: format!("{}{}{}", self.prefix, self.format.format(number), self.suffix),
            position: self.position,
        })
    }
}

/// Resolved label for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLabel {
    pub page: PageRef,
    pub text: String,
    pub position: NumberPosition,
}

fn to_roman(mut number: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut result = String::new();
    for (value, numeral) in NUMERALS {
        while number >= value {
            result.push_str(numeral);
            number -= value;
        }
    }
    result
}

// Bijective base-26: 1 → A, 26 → Z, 27 → AA
fn to_alphabetic(mut number: u32) -> String {
    let mut letters = Vec::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        letters.push(char::from(b'A' + remainder as u8));
        number = (number - 1) / 26;
    }
    letters.iter().rev().collect()
}
