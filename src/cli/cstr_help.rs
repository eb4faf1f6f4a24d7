pub const CSTR_HELP: &str = "
                                General remarks
All quantities are in SI units (volume m3, concentration mol/m3, temperature K, time s).
Check the dimensions of every value you enter: the program never rejects a physically
meaningless input, it just integrates it.

                                Task file
A task is a JSON document. Generate a template (menu item 3) and edit it.

problem_name, problem_description - optional strings, informational only.

initial_state - mandatory:
    volume, concentration, temperature, jacket_temperature
    time - optional start time, 0 by default.

parameters - mandatory, all 19 fields:
    F0     inlet volumetric flow, m3/s
    CA0    inlet concentration, mol/m3
    T0     inlet temperature, K
    TJ0    coolant inlet temperature, K
    KV     outlet valve coefficient, 1/s; outlet flow F = KV*(V - Vmin)
    Vmin   volume at which the outlet flow vanishes, m3
    alpha  pre-exponential factor
    E      activation energy, J/mol
    R      gas constant, J/mol/K
    n      reaction order
    rho, Cp      density and heat capacity of the liquid
    lambda       heat of reaction term (negative - exothermic)
    U, AH        heat transfer coefficient and area
    rhoJ, CJ, VJ density, heat capacity and volume of the jacket
    FJ           coolant flow, m3/s

parameter_updates - optional list of {\"at\": time, \"update\": {field: value, ...}}.
    Only the listed fields are changed; the state is kept.

simulation - optional:
    t_end          simulated time, s (100)
    speed          model steps per tick: 1, 2, 5 or 10
    history_len    number of records kept, null - all
    stop_on_alarm  stop at the first rejected step
    validate       check every step (finite values, volume, concentration)
    limits         {check_finite, volume_floor: Zero|MinimumVolume|Disabled,
                    allow_negative_concentration, max_temperature}

postprocessing - optional:
    plot, gnuplot, plot_in_terminal - charts of the history
    save, save_to_csv               - txt/csv export, file name from filename
    print_every                     - print every n-th record as a table

Running `cstr-sim path/to/task.json` solves the task without the menu.
Files starting with the task prefix (cstr_config.json, task_prefix) are found by
auto-discovery.
";

pub const INTERACTIVE_HELP: &str = "
Commands:
    t or Enter      one tick (speed x model steps)
    r               run to t_end
    s N             speed, N = 1, 2, 5, 10
    p NAME VALUE .. change parameters, e.g. p FJ 0.5 TJ0 290
    v               current state and diagnostics
    params          parameter table
    h               history
    ?               this help
    q               summary and exit
";
