use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use structopt::StructOpt;

use paraulins::db::JsonDb;
use paraulins::log::{info, initialize_logger};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "migrate-store",
    about = "Rewrite a store file in the current schema"
)]
struct Opt {
    /// The data file to migrate in place
    #[structopt(parse(from_os_str))]
    data_file: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();

    let logger = initialize_logger();

    let db = JsonDb::new(Arc::new(logger.clone()), &opt.data_file);

    let document = db.load();
    let children = document.children.len();

    db.save(&document)?;

    info!(
        logger,
        "Rewrote {} children in the current schema", children;
        "path" => %opt.data_file.display()
    );

    Ok(())
}
