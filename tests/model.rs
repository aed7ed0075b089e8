#[cfg(test)]
mod tests {
    use keel::{BackedEnum, Cast, EnumCase, EnumCast, Model, TableRef};

    struct Level;
    impl BackedEnum for Level {
        const NAME: &'static str = "Level";
        const CASES: &'static [EnumCase] = &[EnumCase::Int(1), EnumCase::Int(9)];
    }

    #[derive(Model)]
    struct SimpleEntity;

    #[derive(Model)]
    struct _UnderscoredName;

    #[derive(Model)]
    #[keel(
        name = "audit_log",
        alias = "l",
        primary_key = "entry_id",
        cast(payload = json, at = datetime, level = Level, flags = array, active = bool)
    )]
    struct AuditEntry;

    #[test]
    fn model_defaults() {
        assert_eq!(*SimpleEntity::table(), TableRef::new("simple_entity"));
        assert_eq!(SimpleEntity::table().qualifier(), "simple_entity");
        assert_eq!(SimpleEntity::primary_key(), "id");
        assert!(SimpleEntity::casts().is_empty());
        assert_eq!(SimpleEntity::cast("id"), None);
        assert_eq!(_UnderscoredName::table().name, "underscored_name");
    }

    #[test]
    fn model_attributes() {
        let table = AuditEntry::table();
        assert_eq!(table.name, "audit_log");
        assert_eq!(table.alias, "l");
        assert_eq!(table.qualifier(), "l");
        assert_eq!(AuditEntry::primary_key(), "entry_id");
        assert_eq!(
            AuditEntry::casts()
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>(),
            ["payload", "at", "level", "flags", "active"]
        );
        assert_eq!(AuditEntry::cast("payload"), Some(&Cast::Json));
        assert_eq!(AuditEntry::cast("at"), Some(&Cast::Datetime));
        assert_eq!(AuditEntry::cast("flags"), Some(&Cast::Array));
        assert_eq!(AuditEntry::cast("active"), Some(&Cast::Bool));
        assert_eq!(
            AuditEntry::cast("level"),
            Some(&Cast::Enum(EnumCast::of::<Level>()))
        );
        assert_eq!(AuditEntry::cast("missing"), None);
        assert_eq!(
            AuditEntry::cast("level").map(ToString::to_string),
            Some("enum Level".to_string())
        );
    }
}
