use citibike::{CitiBike, CitiBikeError, Month, NominatimConfig, StationSide, TripFrameFilterExt};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), CitiBikeError> {
    let client = CitiBike::new().await?.with_geocoder_config(
        NominatimConfig::builder()
            .user_agent("citibike-rs-demo")
            .build(),
    );

    let stations = client
        .trips()
        .start(Month::new(3, 2021))
        .end(Month::new(4, 2021))
        .call()
        .await?
        .station_records(StationSide::End)?;
    println!("{} trips ended at a station in March 2021", stations.len());

    let path = Path::new("station_zip_codes.csv");
    let mapping = client.update_zip_code_file(stations, path).await?;
    let unknown = mapping.iter().filter(|(_, zip)| zip.is_unknown()).count();
    println!(
        "{} stations in {} ({} without a ZIP code)",
        mapping.len(),
        path.display(),
        unknown
    );

    Ok(())
}
