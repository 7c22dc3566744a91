//! The immutable configuration threaded through one compile task, built
//! once from parsed CLI flags.

use std::path::PathBuf;

use clap::ArgMatches;

#[derive(Debug, Clone)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub include_dirs: Vec<PathBuf>,
    pub defines: Vec<Define>,
    pub link_libraries: Vec<String>,
    pub preprocess_only: bool,
    pub acc_err: bool,
    pub acc_stats: bool,
    pub one_column: bool,
    pub tab_size: u8,
    pub write_asserts: bool,
    pub cache_dir: Option<PathBuf>,
    pub cache_lifetime: Option<u32>,
    pub cache_enabled: bool,
    pub cache_clear: bool,
    pub cache_print: bool,
    pub source: PathBuf,
    pub output: Option<PathBuf>,
}

impl Options {
    /// Builds an `Options` from parsed CLI flags. The cache-control flags
    /// are read and carried but never acted on: the on-disk build cache
    /// they configure is not implemented here.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let include_dirs = matches
            .get_many::<String>("include_dir")
            .unwrap_or_default()
            .map(PathBuf::from)
            .collect();

        let defines = matches
            .get_many::<String>("define")
            .unwrap_or_default()
            .map(|raw| match raw.split_once('=') {
                Some((name, value)) => Define {
                    name: name.to_string(),
                    value: Some(value.to_string()),
                },
                None => Define {
                    name: raw.to_string(),
                    value: None,
                },
            })
            .collect();

        let link_libraries = matches
            .get_many::<String>("link_library")
            .unwrap_or_default()
            .cloned()
            .collect();

        Self {
            include_dirs,
            defines,
            link_libraries,
            preprocess_only: matches.get_flag("preprocess"),
            acc_err: matches.get_flag("acc_err"),
            acc_stats: matches.get_flag("acc_stats"),
            one_column: matches.get_flag("one_column"),
            tab_size: *matches.get_one::<u8>("tab_size").unwrap_or(&8),
            write_asserts: !matches.get_flag("no_write_asserts"),
            cache_dir: matches.get_one::<String>("cache_dir").map(PathBuf::from),
            cache_lifetime: matches.get_one::<u32>("cache_lifetime").copied(),
            cache_enabled: !matches.get_flag("no_cache"),
            cache_clear: matches.get_flag("cache_clear"),
            cache_print: matches.get_flag("cache_print"),
            source: PathBuf::from(matches.get_one::<String>("source").expect("required")),
            output: matches.get_one::<String>("object").map(PathBuf::from),
        }
    }

    /// The path the object file is written to absent an explicit `-o`: the
    /// source path with its extension replaced by `.o`.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.source.with_extension("o"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_app;

    fn parse(args: &[&str]) -> Options {
        let matches = build_app().try_get_matches_from(args).expect("valid args");
        Options::from_matches(&matches)
    }

    #[test]
    fn defines_with_a_value_split_on_equals() {
        let options = parse(&["vbc", "-D", "DEBUG=1", "map01.acs"]);
        assert_eq!(options.defines[0].name, "DEBUG");
        assert_eq!(options.defines[0].value.as_deref(), Some("1"));
    }

    #[test]
    fn defines_without_a_value_have_none() {
        let options = parse(&["vbc", "-D", "DEBUG", "map01.acs"]);
        assert_eq!(options.defines[0].name, "DEBUG");
        assert_eq!(options.defines[0].value, None);
    }

    #[test]
    fn write_asserts_defaults_to_on() {
        let options = parse(&["vbc", "map01.acs"]);
        assert!(options.write_asserts);
    }

    #[test]
    fn no_write_asserts_turns_it_off() {
        let options = parse(&["vbc", "--no-write-asserts", "map01.acs"]);
        assert!(!options.write_asserts);
    }

    #[test]
    fn output_path_defaults_to_the_source_with_an_o_extension() {
        let options = parse(&["vbc", "map01.acs"]);
        assert_eq!(options.output_path(), PathBuf::from("map01.o"));
    }
}
