crate::define_name_enum! {
    /// A named build phase. Strategies no-op stages they don't recognize.
    Stage {
        Install => "install",
        Build => "build",
    }
}

impl Stage {
    /// Stages run when the caller doesn't ask for any.
    pub fn defaults() -> Vec<Stage> {
        vec![Stage::Install, Stage::Build]
    }

    /// Parses a comma separated stage list, ignoring blank entries.
    pub fn parse_list(list: &str) -> Vec<Stage> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Stage::parse)
            .collect()
    }
}
