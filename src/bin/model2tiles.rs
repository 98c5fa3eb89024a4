use model2tiles::cli::run;

fn main() -> anyhow::Result<()> {
    run()
}
