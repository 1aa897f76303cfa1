//! tcad binary entry point.

fn main() -> anyhow::Result<()> {
    textcad::cli::run()
}
