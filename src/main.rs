use sitewatch::error::AppResult;

fn main() -> AppResult<()> {
    sitewatch::run()
}
