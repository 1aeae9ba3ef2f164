//! Product catalog types

/// Column headers shared by the report sheets and the snapshot decoder
pub const HEADERS: [&str; 3] = ["Molecule", "Product Number", "Product Name"];

/// One catalog row. Two records are the same product iff all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductRecord {
    pub molecule: String,
    pub product_number: String,
    pub product_name: String,
}

impl ProductRecord {
    pub fn new(
        molecule: impl Into<String>,
        product_number: impl Into<String>,
        product_name: impl Into<String>,
    ) -> Self {
        Self {
            molecule: molecule.into(),
            product_number: product_number.into(),
            product_name: product_name.into(),
        }
    }

    /// Fields in column order
    pub fn fields(&self) -> [&str; 3] {
        [&self.molecule, &self.product_number, &self.product_name]
    }
}

/// Records in page order, as observed during one run
pub type Catalog = Vec<ProductRecord>;

/// Product platform groupings on the source page, in extraction order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowGroup {
    Vlp,
    DetergentMicelle,
    Nanodisc,
}

impl RowGroup {
    pub const ALL: [RowGroup; 3] = [RowGroup::Vlp, RowGroup::DetergentMicelle, RowGroup::Nanodisc];

    /// Element id of the group's table body
    pub fn id(&self) -> &'static str {
        match self {
            RowGroup::Vlp => "auto_vlp",
            RowGroup::DetergentMicelle => "auto_detergent_micelle",
            RowGroup::Nanodisc => "auto_nanodisc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RowGroup::Vlp => "vlp",
            RowGroup::DetergentMicelle => "detergent_micelle",
            RowGroup::Nanodisc => "nanodisc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality() {
        let a = ProductRecord::new("MolA", "P1", "NameA");
        let b = ProductRecord::new("MolA".to_string(), "P1", "NameA");
        let c = ProductRecord::new("MolA", "P1", "NameA v2");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_row_group_order() {
        let ids: Vec<_> = RowGroup::ALL.iter().map(|g| g.id()).collect();
        assert_eq!(ids, ["auto_vlp", "auto_detergent_micelle", "auto_nanodisc"]);
    }
}
