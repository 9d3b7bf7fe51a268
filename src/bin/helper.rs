//! Exécutable auxiliaire : processus de contenu uniquement.
//!
//! Lancé par Servo avec `--content-process <token>`. Sans token, il n'a
//! rien à faire et sort en erreur.

use std::process::ExitCode;

use lanterne::process::ProcessRole;

fn main() -> ExitCode {
    match ProcessRole::from_env() {
        ProcessRole::Content { token } => {
            servo::run_content_process(token);
            ExitCode::SUCCESS
        }
        ProcessRole::Browser => {
            eprintln!("lanterne-helper: expected --content-process <token>");
            ExitCode::FAILURE
        }
    }
}
