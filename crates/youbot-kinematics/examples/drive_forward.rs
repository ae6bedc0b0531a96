use youbot_kinematics::*;

fn main() {
    let limit = 5.0;
    let dt = 0.1; // Time step in seconds
    let num_steps = 10;

    let mut current = Configuration::default();
    // Wheels asked for 10 rad/s, clamped to the 5 rad/s limit.
    let command = Command::new(ArmJoints::default(), WheelSpeeds::new(10.0, 10.0, 10.0, 10.0));

    match KinematicModel::youbot() {
        Ok(model) => {
            println!("Initializing simulation...");
            println!("  {}", model.geometry());
            println!("  Integrator:     {}", model.integrator());
            println!("  Initial State:  {}", current);
            println!("  Command:        {}", command);
            println!("  Time Step:      {} s", dt);
            println!("  Num Steps:      {}", num_steps);
            println!("\nSimulating...");

            for i in 0..num_steps {
                match model.step(&current, &command, dt, limit) {
                    Ok(next) => {
                        current = next;
                        println!("Step {:>2}: {}", i + 1, current.chassis);
                    }
                    Err(e) => {
                        eprintln!("Error during simulation step {}: {}", i + 1, e);
                        break;
                    }
                }
            }

            println!("\nSimulation complete.");
            println!("Final Configuration: {}", current);
        }
        Err(e) => {
            eprintln!("Failed to initialize kinematics: {}", e);
        }
    }
}
