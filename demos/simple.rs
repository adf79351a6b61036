use pointer_fusion::{Device, DeviceEvent, DeviceSettings, Motion, SensorSample, Timestamp};

const REPORT_PERIOD_US: i64 = 10_000; // 10 ms between device reports

fn main() {
    let settings = DeviceSettings::default();
    let mut device = Device::new(&settings);

    for i in 0..10 {
        // this loop should repeat each time a new report arrives from the remote
        let usecs = i * REPORT_PERIOD_US;
        let time = Timestamp::new(usecs / 1_000_000, usecs % 1_000_000);

        let tilt = SensorSample::new(0, 100); // replace this with actual accelerometer data
        let slots = [
            SensorSample::new(412 + i as i32, 380), // replace these with actual IR camera slots
            SensorSample::new(612 + i as i32, 380),
            SensorSample::missing(),
            SensorSample::missing(),
        ];

        device.handle_event(&settings, &DeviceEvent::Accelerometer { time, sample: tilt });
        device.handle_event(&settings, &DeviceEvent::Ir { time, slots });

        let output = device.tick(&settings);
        let position = device.position();

        match output.pointer {
            Some(Motion::Absolute { x, y }) => println!(
                "Tracked: ({:.1}, {:.1}), Cursor: ({x}, {y}), Angle: {:.2}",
                position.x,
                position.y,
                device.rotation_angle(&settings)
            ),
            _ => println!("Tracked: ({:.1}, {:.1}), cursor steady", position.x, position.y),
        }
    }
}
