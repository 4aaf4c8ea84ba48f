use citibike::{write_trips_csv, CitiBike, CitiBikeError, LatLon, Month};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), CitiBikeError> {
    let client = CitiBike::new().await?;

    // Around Metropolitan Ave & Bedford Ave, Williamsburg.
    let local = client
        .local_trips()
        .location(LatLon(40.7116453, -73.9513869))
        .start(Month::new(4, 2019))
        .end(Month::new(4, 2021))
        .call()
        .await?;

    let written = write_trips_csv(local, Path::new("citi_bike_local.csv")).await?;
    println!("Wrote {} local trips to citi_bike_local.csv", written);

    Ok(())
}
