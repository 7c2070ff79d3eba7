mod command;
mod logging;
mod model;
mod util;

fn main() -> anyhow::Result<()> {
    logging::init()?;
    command::run()
}
