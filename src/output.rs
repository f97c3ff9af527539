use std::fmt;

use serde::Deserialize;

use crate::processing::color::ColorResult;

/// How a [`ColorResult`] is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ColorFormat {
    /// `#RRGGBB`; alpha is never shown.
    #[default]
    Hex,
    /// `RRGGBB-AA`; alpha is `FF` for opaque sources.
    HexAlpha,
    /// `rgb(r, g, b)` or `rgba(r, g, b, a)` when alpha is present.
    Rgb,
}

impl ColorFormat {
    #[must_use]
    pub fn render(self, color: &ColorResult) -> String {
        let ColorResult { r, g, b, a } = *color;
        match self {
            Self::Hex => format!("#{r:02X}{g:02X}{b:02X}"),
            Self::HexAlpha => format!("{r:02X}{g:02X}{b:02X}-{:02X}", a.unwrap_or(u8::MAX)),
            Self::Rgb => match a {
                Some(a) => format!("rgba({r}, {g}, {b}, {a})"),
                None => format!("rgb({r}, {g}, {b})"),
            },
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hex => "hex",
            Self::HexAlpha => "hex-alpha",
            Self::Rgb => "rgb",
        })
    }
}
