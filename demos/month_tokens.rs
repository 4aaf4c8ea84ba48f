use citibike::{month_range, Month};

fn main() {
    let tokens = month_range(Month::new(4, 2016), Month::new(4, 2017));
    for token in &tokens {
        println!("20{}-citibike-tripdata.parquet", token);
    }
}
