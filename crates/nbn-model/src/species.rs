/// Column order of the species list export.
pub const SPECIES_COLUMNS: [&str; 8] = [
    "taxon_key",
    "preferred_tvk",
    "name",
    "authority",
    "group",
    "name_type",
    "well_formed",
    "msg_id",
];

/// One row of the master species list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpeciesEntry {
    pub taxon_key: String,
    pub preferred_tvk: String,
    pub name: String,
    pub authority: String,
    pub group: String,
    pub name_type: String,
    pub well_formed: String,
    pub msg_id: String,
}

impl SpeciesEntry {
    /// Builds an entry from exactly [`SPECIES_COLUMNS`]`.len()` fields.
    #[must_use]
    pub fn from_fields(fields: &[&str]) -> Option<Self> {
        let [
            taxon_key,
            preferred_tvk,
            name,
            authority,
            group,
            name_type,
            well_formed,
            msg_id,
        ] = fields
        else {
            return None;
        };
        Some(Self {
            taxon_key: (*taxon_key).to_string(),
            preferred_tvk: (*preferred_tvk).to_string(),
            name: (*name).to_string(),
            authority: (*authority).to_string(),
            group: (*group).to_string(),
            name_type: (*name_type).to_string(),
            well_formed: (*well_formed).to_string(),
            msg_id: (*msg_id).to_string(),
        })
    }

    /// Field values in [`SPECIES_COLUMNS`] order.
    #[must_use]
    pub fn values(&self) -> [&str; 8] {
        [
            &self.taxon_key,
            &self.preferred_tvk,
            &self.name,
            &self.authority,
            &self.group,
            &self.name_type,
            &self.well_formed,
            &self.msg_id,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_eight_fields_only() {
        let fields = [
            "NBNSYS0000001",
            "NBNSYS0000001",
            "Bombus terrestris",
            "(Linnaeus, 1758)",
            "insect - hymenopteran",
            "S",
            "Y",
            "1",
        ];
        let entry = SpeciesEntry::from_fields(&fields).unwrap();
        assert_eq!(entry.name, "Bombus terrestris");
        assert_eq!(entry.values()[7], "1");
        assert!(SpeciesEntry::from_fields(&fields[..7]).is_none());
    }
}
