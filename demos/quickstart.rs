use serde_json::json;
use tempoline::time::micros;
use tempoline::{InMemoryProvider, Interval, LinearEquation, Real, Segment, Session, Windows};

const SECOND: i64 = 1_000_000;

fn main() -> tempoline::Result<()> {
    let provider = InMemoryProvider::new().with_resource(
        "visible",
        vec![
            Segment::new(json!(true), Interval::closed(micros(5 * SECOND), micros(20 * SECOND))),
            Segment::new(json!(true), Interval::closed(micros(40 * SECOND), micros(55 * SECOND))),
        ],
    );
    let session = Session::new(provider);

    let temperature = Real::linear(LinearEquation::new(micros(0), 10.0, 0.5));
    let cool = temperature.less_than(&Real::value(30.0));
    let visible = Windows::resource(&session, "visible").assign_gaps(false);
    let opportunities = cool.and(&visible).longer_than(micros(10 * SECOND));

    let bounds = Interval::closed(micros(0), micros(60 * SECOND));
    for segment in opportunities.collect(bounds)? {
        println!("{segment}");
    }
    Ok(())
}
