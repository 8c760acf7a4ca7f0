use drone_fc::{Attitude, Planar, SharedState};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use futures::executor::block_on;
use mems_bus::{Timeout, Vector3};

const ITERATIONS: u32 = 2_000;

#[test]
fn readers_never_see_partial_updates() {
    let shared = SharedState::<CriticalSectionRawMutex>::new(Timeout::Never);

    std::thread::scope(|s| {
        s.spawn(|| {
            block_on(async {
                for n in 1..=ITERATIONS {
                    let mut state = shared.lock().await.unwrap();
                    let v = n as f32;
                    state.sequence = n;
                    state.acceleration = Vector3::new(v, v, v);
                    // Give the reader a chance to run mid-update.
                    std::thread::yield_now();
                    state.attitude = Attitude { pitch: v, roll: v };
                    state.position = Planar::new(v, v);
                }
            })
        });

        s.spawn(|| {
            block_on(async {
                let mut last = 0;
                while last < ITERATIONS {
                    let snapshot = shared.snapshot().await.unwrap();
                    let v = snapshot.sequence as f32;
                    assert_eq!(snapshot.acceleration, Vector3::new(v, v, v));
                    assert_eq!(snapshot.attitude, Attitude { pitch: v, roll: v });
                    assert_eq!(snapshot.position, Planar::new(v, v));
                    assert!(snapshot.sequence >= last);
                    last = snapshot.sequence;
                }
            })
        });
    });
}

#[test]
fn bounded_lock_waits_for_a_busy_writer() {
    let shared = SharedState::<CriticalSectionRawMutex>::new(Timeout::After(
        embassy_time::Duration::from_secs(1),
    ));

    std::thread::scope(|s| {
        let guard = block_on(shared.lock()).unwrap();
        let reader = s.spawn(|| block_on(shared.snapshot()));
        std::thread::sleep(std::time::Duration::from_millis(20));
        drop(guard);
        assert!(reader.join().unwrap().is_ok());
    });
}
