mod cli;

use resdesk_core::api::RequestError;

fn main() {
    if let Err(e) = cli::run() {
        let interrupted = e
            .chain()
            .any(|cause| cause.downcast_ref::<RequestError>().is_some_and(RequestError::is_cancelled));
        if interrupted {
            eprintln!("Interrupted.");
            std::process::exit(130);
        }
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}
