use le_marche_api::run;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("application error: {err}");
            std::process::exit(le_marche_api::exit_code(&err));
        }
    }
}
