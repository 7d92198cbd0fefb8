//! Series colors.

use plotters::style::RGBColor;

/// Color of the observed series.
pub const TRUTH_COLOR: RGBColor = RGBColor(0x2c, 0x3e, 0x50);

/// Tableau10 categorical scheme.
pub const TABLEAU10: [RGBColor; 10] = [
    RGBColor(0x4e, 0x79, 0xa7),
    RGBColor(0xf2, 0x8e, 0x2c),
    RGBColor(0xe1, 0x57, 0x59),
    RGBColor(0x76, 0xb7, 0xb2),
    RGBColor(0x59, 0xa1, 0x4f),
    RGBColor(0xed, 0xc9, 0x49),
    RGBColor(0xaf, 0x7a, 0xa1),
    RGBColor(0xff, 0x9d, 0xa7),
    RGBColor(0x9c, 0x75, 0x5f),
    RGBColor(0xba, 0xb0, 0xab),
];

/// Ordinal palette: a name keeps the color it was first given for the life
/// of the palette. Colors cycle after ten names.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    names: Vec<String>,
}

impl Palette {
    pub fn color(&mut self, name: &str) -> RGBColor {
        let index = match self.names.iter().position(|n| n == name) {
            Some(i) => i,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        };
        TABLEAU10[index % TABLEAU10.len()]
    }
}

pub fn hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_keep_their_first_color() {
        let mut palette = Palette::default();
        assert_eq!(hex(palette.color("ARIMA")), "#4e79a7");
        assert_eq!(hex(palette.color("ARGO")), "#f28e2c");
        assert_eq!(hex(palette.color("ARIMA")), "#4e79a7");
        assert_eq!(hex(TRUTH_COLOR), "#2c3e50");
    }

    #[test]
    fn colors_cycle_after_ten_names() {
        let mut palette = Palette::default();
        for i in 0..10 {
            palette.color(&format!("m{i}"));
        }
        assert_eq!(palette.color("m10"), TABLEAU10[0]);
    }
}
