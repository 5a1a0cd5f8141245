use super::element::Element;
use nalgebra::Point3;

/// Represents a single atom of a molecular structure.
///
/// Atoms carry only what the substitution workflow needs: the element identity,
/// which is what a substitution changes, and the Cartesian position in
/// Angstroms, which substitutions never touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    /// The chemical element occupying this position.
    pub element: Element,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self { element, position }
    }

    #[inline]
    pub fn symbol(&self) -> &'static str {
        self.element.symbol()
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number()
    }
}
