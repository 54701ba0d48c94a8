//! Dump/load variant vocabulary.
//!
//! This registry defines the canonical, ordered set of ways the dump/load utility is invoked by a matrix run.
//! Callers should avoid hard-coding variant names or subcommands and instead use [`VariantKind`] for identity.
//!
//! ## Notes
//! - The order of [`VARIANTS`] is the execution order of every matrix. Reports and custom expectations refer to
//!   variants by name in that order, so entries are only ever appended.
//! - Matching on names is **case-sensitive** (`loadDump`, not `loaddump`).

/// Stable identifier for a dump/load variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantKind {
    // Dumps
    DumpInstance,
    DumpSchemas,
    DumpTables,

    // Single-table transfer
    ExportTable,
    ImportTable,

    // Restore
    LoadDump,
}

/// Metadata for a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantInfo {
    pub id: VariantKind,
    /// Variant name used in reports and as the key of expectation overrides.
    pub name: &'static str,
    /// Utility subcommand passed after `util`.
    pub subcommand: &'static str,
    /// Fixed tokens naming the default target of the operation.
    pub leading_args: &'static [&'static str],
    pub description: &'static str,
}

/// Registry of all variants, in canonical execution order.
pub const VARIANTS: &[VariantInfo] = &[
    info(
        VariantKind::DumpInstance,
        "dumpInstance",
        "dump-instance",
        &["folder"],
        "Dump every schema of the instance into a folder.",
    ),
    info(
        VariantKind::DumpSchemas,
        "dumpSchemas",
        "dump-schemas",
        &["sakila", "--output-url=folder"],
        "Dump the selected schemas.",
    ),
    info(
        VariantKind::DumpTables,
        "dumpTables",
        "dump-tables",
        &["sakila", "actor", "--output-url=folder"],
        "Dump the selected tables of one schema.",
    ),
    info(
        VariantKind::ExportTable,
        "exportTable",
        "export-table",
        &["sakila.actor", "folder"],
        "Export a single table to a data file.",
    ),
    info(
        VariantKind::ImportTable,
        "importTable",
        "import-table",
        &["path"],
        "Import a data file into a table.",
    ),
    info(
        VariantKind::LoadDump,
        "loadDump",
        "load-dump",
        &["sample"],
        "Load a dump produced by any of the dump variants.",
    ),
];

impl VariantKind {
    /// Every variant kind, in registry order.
    pub const ALL: [VariantKind; 6] = [
        VariantKind::DumpInstance,
        VariantKind::DumpSchemas,
        VariantKind::DumpTables,
        VariantKind::ExportTable,
        VariantKind::ImportTable,
        VariantKind::LoadDump,
    ];

    /// Resolve a variant name to a [`VariantKind`].
    ///
    /// ## Parameters
    /// - `name`: Candidate variant name (e.g. `"dumpSchemas"`).
    ///
    /// ## Returns
    /// - `Some(VariantKind)` if `name` matches a registered variant.
    /// - `None` otherwise.
    pub fn from_name(name: &str) -> Option<VariantKind> {
        VARIANTS.iter().find(|v| v.name == name).map(|v| v.id)
    }

    /// Return the canonical name of this variant.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Return the utility subcommand of this variant.
    pub fn subcommand(self) -> &'static str {
        self.info().subcommand
    }

    /// Return the fixed leading tokens of this variant.
    pub fn leading_args(self) -> &'static [&'static str] {
        self.info().leading_args
    }

    /// Return the position of this variant in the registry.
    pub fn position(self) -> usize {
        self as usize
    }

    /// Return the full metadata entry for this variant.
    pub fn info(self) -> &'static VariantInfo {
        info_for(self)
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Return the full metadata entry for a variant.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: VariantKind) -> &'static VariantInfo {
    VARIANTS.iter().find(|v| v.id == id).expect("variant info missing")
}

const fn info(
    id: VariantKind,
    name: &'static str,
    subcommand: &'static str,
    leading_args: &'static [&'static str],
    description: &'static str,
) -> VariantInfo {
    VariantInfo {
        id,
        name,
        subcommand,
        leading_args,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_matches_all_order() {
        let ids: Vec<VariantKind> = VARIANTS.iter().map(|v| v.id).collect();
        assert_eq!(ids, VariantKind::ALL.to_vec());
    }

    #[test]
    fn test_position_is_registry_index() {
        for (index, kind) in VariantKind::ALL.iter().enumerate() {
            assert_eq!(kind.position(), index);
        }
    }

    #[test]
    fn test_from_name_round_trips() {
        for kind in VariantKind::ALL {
            assert_eq!(VariantKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_from_name_is_case_sensitive() {
        assert_eq!(VariantKind::from_name("loaddump"), None);
        assert_eq!(VariantKind::from_name("load-dump"), None);
        assert_eq!(VariantKind::from_name(""), None);
    }

    #[test]
    fn test_leading_args() {
        assert_eq!(VariantKind::DumpInstance.leading_args(), &["folder"]);
        assert_eq!(
            VariantKind::DumpTables.leading_args(),
            &["sakila", "actor", "--output-url=folder"]
        );
        assert_eq!(VariantKind::LoadDump.subcommand(), "load-dump");
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(VariantKind::ExportTable.to_string(), "exportTable");
    }
}
