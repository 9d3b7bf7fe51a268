//! Rôle du processus courant.
//!
//! Servo relance l'exécutable avec `--content-process <token>` pour ses
//! processus de contenu. Ces processus ne doivent jamais atteindre la
//! création de fenêtre.

pub const CONTENT_PROCESS_SWITCH: &str = "--content-process";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRole {
    /// Processus principal : moteur + fenêtre.
    Browser,
    /// Processus de contenu, rattaché au principal par `token`.
    Content { token: String },
}

impl ProcessRole {
    /// Détermine le rôle depuis les arguments (sans le nom du programme).
    ///
    /// Accepte `--content-process <token>` et `--content-process=<token>`.
    /// Un switch sans token laisse le rôle principal.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            if arg == CONTENT_PROCESS_SWITCH {
                if let Some(token) = args.next() {
                    let token = token.as_ref();
                    if !token.is_empty() && !token.starts_with("--") {
                        return Self::Content {
                            token: token.to_string(),
                        };
                    }
                }
                break;
            }
            if let Some(token) = arg
                .strip_prefix(CONTENT_PROCESS_SWITCH)
                .and_then(|rest| rest.strip_prefix('='))
                && !token.is_empty()
            {
                return Self::Content {
                    token: token.to_string(),
                };
            }
        }
        Self::Browser
    }

    pub fn from_env() -> Self {
        Self::from_args(std::env::args().skip(1))
    }

    pub fn is_browser(&self) -> bool {
        matches!(self, Self::Browser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_switch_is_browser() {
        assert_eq!(
            ProcessRole::from_args(["https://servo.org", "--enable-gpu"]),
            ProcessRole::Browser
        );
        assert!(ProcessRole::from_args(Vec::<String>::new()).is_browser());
    }

    #[test]
    fn test_content_process_separate_token() {
        assert_eq!(
            ProcessRole::from_args(["--content-process", "abc123"]),
            ProcessRole::Content {
                token: "abc123".to_string()
            }
        );
    }

    #[test]
    fn test_content_process_inline_token() {
        assert_eq!(
            ProcessRole::from_args(["--foo", "--content-process=xyz"]),
            ProcessRole::Content {
                token: "xyz".to_string()
            }
        );
    }

    #[test]
    fn test_missing_token_stays_browser() {
        assert!(ProcessRole::from_args(["--content-process"]).is_browser());
        assert!(ProcessRole::from_args(["--content-process", "--other"]).is_browser());
        assert!(ProcessRole::from_args(["--content-process="]).is_browser());
    }
}
