use crate::foundation::core::Rgb8;

/// Tableau10 categorical scheme.
pub const TABLEAU10: [Rgb8; 10] = [
    Rgb8::from_hex(0x4e79a7),
    Rgb8::from_hex(0xf28e2c),
    Rgb8::from_hex(0xe15759),
    Rgb8::from_hex(0x76b7b2),
    Rgb8::from_hex(0x59a14f),
    Rgb8::from_hex(0xedc949),
    Rgb8::from_hex(0xaf7aa1),
    Rgb8::from_hex(0xff9da7),
    Rgb8::from_hex(0x9c755f),
    Rgb8::from_hex(0xbab0ab),
];

/// Ordinal colour for the name at `index` in first-seen order. Wraps after ten names.
pub fn ordinal_color(index: usize) -> Rgb8 {
    TABLEAU10[index % TABLEAU10.len()]
}
