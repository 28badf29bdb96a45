//! CLI argument parsing.
//!
//! Accepts any iterator of strings so parsing can be tested without touching
//! `std::env::args()`.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Output overrides shared by `run` and `preset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Write the trajectory as CSV to this path.
    pub csv: Option<PathBuf>,
    /// Write the trajectory as JSON Lines to this path.
    pub jsonl: Option<PathBuf>,
    /// Export every n-th step.
    pub decimation: Option<usize>,
    /// Enable verbose output.
    pub verbose: bool,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a scenario from a YAML file
    Run {
        /// Path to the scenario YAML file.
        scenario_path: PathBuf,
        /// Output overrides.
        output: OutputArgs,
    },
    /// Run a named preset scenario
    Preset {
        /// Preset name.
        name: String,
        /// Output overrides.
        output: OutputArgs,
    },
    /// List available presets
    ListPresets,
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => match args.get(2) {
                Some(path) => Command::Run {
                    scenario_path: PathBuf::from(path),
                    output: Self::parse_output_args(&args[3..]),
                },
                None => {
                    eprintln!("Error: 'run' command requires scenario path");
                    Command::Help
                }
            },
            "preset" => match args.get(2) {
                Some(name) => Command::Preset {
                    name: name.clone(),
                    output: Self::parse_output_args(&args[3..]),
                },
                None => {
                    eprintln!("Error: 'preset' command requires preset name");
                    Command::Help
                }
            },
            "list-presets" => Command::ListPresets,
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Parse the trailing output flags.
    fn parse_output_args(args: &[String]) -> OutputArgs {
        let mut output = OutputArgs::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--csv" => {
                    if let Some(path) = args.get(i + 1) {
                        output.csv = Some(PathBuf::from(path));
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                "--jsonl" => {
                    if let Some(path) = args.get(i + 1) {
                        output.jsonl = Some(PathBuf::from(path));
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                "--decimate" => {
                    if let Some(n) = args.get(i + 1) {
                        match n.parse() {
                            Ok(n) if n > 0 => output.decimation = Some(n),
                            _ => eprintln!("Warning: ignoring invalid --decimate value '{n}'"),
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                "-v" | "--verbose" => {
                    output.verbose = true;
                    i += 1;
                }
                other => {
                    eprintln!("Warning: ignoring unknown option '{other}'");
                    i += 1;
                }
            }
        }

        output
    }
}
