use anyhow::Result;

fn main() -> Result<()> {
    let matches = nearby::cli::parse_args();
    nearby::boot::init_common(nearby::boot::is_interactive(&matches));
    nearby::boot::block_on(nearby::boot::run(&matches))
}
