use phf::{Map, phf_map};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest atomic number known to the element table.
pub const MAX_ATOMIC_NUMBER: u8 = 118;

static SYMBOLS: [&str; MAX_ATOMIC_NUMBER as usize] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

static ATOMIC_NUMBERS: Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15, "S" => 16,
    "Cl" => 17, "Ar" => 18, "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22, "V" => 23, "Cr" => 24,
    "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29, "Zn" => 30, "Ga" => 31, "Ge" => 32,
    "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36, "Rb" => 37, "Sr" => 38, "Y" => 39, "Zr" => 40,
    "Nb" => 41, "Mo" => 42, "Tc" => 43, "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48,
    "In" => 49, "Sn" => 50, "Sb" => 51, "Te" => 52, "I" => 53, "Xe" => 54, "Cs" => 55, "Ba" => 56,
    "La" => 57, "Ce" => 58, "Pr" => 59, "Nd" => 60, "Pm" => 61, "Sm" => 62, "Eu" => 63, "Gd" => 64,
    "Tb" => 65, "Dy" => 66, "Ho" => 67, "Er" => 68, "Tm" => 69, "Yb" => 70, "Lu" => 71, "Hf" => 72,
    "Ta" => 73, "W" => 74, "Re" => 75, "Os" => 76, "Ir" => 77, "Pt" => 78, "Au" => 79, "Hg" => 80,
    "Tl" => 81, "Pb" => 82, "Bi" => 83, "Po" => 84, "At" => 85, "Rn" => 86, "Fr" => 87, "Ra" => 88,
    "Ac" => 89, "Th" => 90, "Pa" => 91, "U" => 92, "Np" => 93, "Pu" => 94, "Am" => 95, "Cm" => 96,
    "Bk" => 97, "Cf" => 98, "Es" => 99, "Fm" => 100, "Md" => 101, "No" => 102, "Lr" => 103, "Rf" => 104,
    "Db" => 105, "Sg" => 106, "Bh" => 107, "Hs" => 108, "Mt" => 109, "Ds" => 110, "Rg" => 111, "Cn" => 112,
    "Nh" => 113, "Fl" => 114, "Mc" => 115, "Lv" => 116, "Ts" => 117, "Og" => 118,
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ElementError {
    #[error("Unknown element symbol: '{0}'")]
    UnknownSymbol(String),
    #[error("Atomic number {0} is outside the periodic table (1-118)")]
    InvalidAtomicNumber(i32),
}

/// A chemical element identified by its atomic number.
///
/// Substitution levels are expressed as offsets in atomic number, so the
/// element type supports shifting up and down the periodic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Element(u8);

impl Element {
    pub const BORON: Element = Element(5);
    pub const CARBON: Element = Element(6);
    pub const NITROGEN: Element = Element(7);

    pub fn from_atomic_number(number: u8) -> Result<Self, ElementError> {
        if (1..=MAX_ATOMIC_NUMBER).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ElementError::InvalidAtomicNumber(number as i32))
        }
    }

    /// Looks up an element by symbol. Leading/trailing whitespace is ignored and
    /// the match is case-insensitive (`"c"`, `"C"` and `" CU "` are all accepted).
    pub fn from_symbol(symbol: &str) -> Result<Self, ElementError> {
        let normalized = normalize_symbol(symbol);
        ATOMIC_NUMBERS
            .get(normalized.as_str())
            .map(|&z| Self(z))
            .ok_or_else(|| ElementError::UnknownSymbol(symbol.trim().to_string()))
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn symbol(&self) -> &'static str {
        SYMBOLS[(self.0 - 1) as usize]
    }

    /// Returns the element `offset` positions away in the periodic table.
    pub fn shifted(&self, offset: i32) -> Result<Self, ElementError> {
        let target = self.0 as i32 + offset;
        if (1..=MAX_ATOMIC_NUMBER as i32).contains(&target) {
            Ok(Self(target as u8))
        } else {
            Err(ElementError::InvalidAtomicNumber(target))
        }
    }
}

fn normalize_symbol(symbol: &str) -> String {
    let mut chars = symbol.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s)
    }
}

impl TryFrom<String> for Element {
    type Error = ElementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_symbol(&value)
    }
}
