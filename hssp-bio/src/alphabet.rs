//! Residue alphabet used by HSSP profiles

/// The 20 canonical amino acids in HSSP profile column order
pub const PROFILE_ORDER: &[u8; 20] = b"VLIMFWYGAPSTCHRKQEND";

/// Marks a deletion inside the aligned span of a hit
pub const DELETION_MARKER: u8 = b'.';

/// Fills columns outside the aligned span of a hit
pub const BLANK: u8 = b' ';

/// Amino-acid composition in percent (Robinson & Robinson), in profile order.
/// Used to split Asx and Glx into their acid and amide forms.
pub const BACKGROUND_FREQUENCIES: [f64; 20] = [
    6.4, 9.1, 5.3, 2.3, 3.9, 1.3, 3.2, 7.4, 7.8, 5.2, 7.1, 5.9, 1.9, 2.3, 5.1, 5.9, 4.3, 6.3, 4.5,
    5.4,
];

const IX_Q: usize = 16;
const IX_E: usize = 17;
const IX_N: usize = 18;
const IX_D: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidueClass {
    /// Index into [`PROFILE_ORDER`]
    Canonical(usize),
    /// B: aspartate or asparagine
    Asx,
    /// Z: glutamate or glutamine
    Glx,
    /// X: any amino acid
    Unknown,
    Gap,
    Invalid,
}

const fn build_table() -> [ResidueClass; 256] {
    let mut table = [ResidueClass::Invalid; 256];

    let mut i = 0;
    while i < PROFILE_ORDER.len() {
        let upper = PROFILE_ORDER[i];
        table[upper as usize] = ResidueClass::Canonical(i);
        table[upper.to_ascii_lowercase() as usize] = ResidueClass::Canonical(i);
        i += 1;
    }

    table[b'B' as usize] = ResidueClass::Asx;
    table[b'b' as usize] = ResidueClass::Asx;
    table[b'Z' as usize] = ResidueClass::Glx;
    table[b'z' as usize] = ResidueClass::Glx;
    table[b'X' as usize] = ResidueClass::Unknown;
    table[b'x' as usize] = ResidueClass::Unknown;

    table[b'-' as usize] = ResidueClass::Gap;
    table[b'~' as usize] = ResidueClass::Gap;
    table[b'.' as usize] = ResidueClass::Gap;
    table[b'_' as usize] = ResidueClass::Gap;
    table[b' ' as usize] = ResidueClass::Gap;

    table
}

static RESIDUE_TABLE: [ResidueClass; 256] = build_table();

#[inline]
pub fn classify(c: u8) -> ResidueClass {
    RESIDUE_TABLE[c as usize]
}

#[inline]
pub fn is_gap(c: u8) -> bool {
    classify(c) == ResidueClass::Gap
}

#[inline]
pub fn is_valid(c: u8) -> bool {
    classify(c) != ResidueClass::Invalid
}

/// Profile column of a canonical residue, either case
#[inline]
pub fn profile_index(c: u8) -> Option<usize> {
    match classify(c) {
        ResidueClass::Canonical(ix) => Some(ix),
        _ => None,
    }
}

/// Case-insensitive identity; lower case only marks insertion flanks
#[inline]
pub fn same_residue(a: u8, b: u8) -> bool {
    a.eq_ignore_ascii_case(&b)
}

/// Profile contributions of one observed residue: canonical residues count
/// once, Asx and Glx are split by background frequency, X and gaps add nothing.
pub fn profile_contributions(c: u8) -> [(usize, f64); 2] {
    match classify(c) {
        ResidueClass::Canonical(ix) => [(ix, 1.0), (ix, 0.0)],
        ResidueClass::Asx => split(IX_D, IX_N),
        ResidueClass::Glx => split(IX_E, IX_Q),
        _ => [(0, 0.0), (0, 0.0)],
    }
}

fn split(acid: usize, amide: usize) -> [(usize, f64); 2] {
    let total = BACKGROUND_FREQUENCIES[acid] + BACKGROUND_FREQUENCIES[amide];
    [
        (acid, BACKGROUND_FREQUENCIES[acid] / total),
        (amide, BACKGROUND_FREQUENCIES[amide] / total),
    ]
}
