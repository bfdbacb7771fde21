mod config_loading;
mod impedance_scenarios;
mod observer_convergence;
