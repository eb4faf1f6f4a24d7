//! # Reactor Initial Value Problem (IVP) Module
//!
//! This module provides a dynamic model of a jacketed continuously stirred tank reactor (CSTR)
//! with variable liquid volume and a single exothermic reaction `A -> products` of arbitrary
//! (not necessarily integer) order, advanced in time with a fixed-step classical Runge-Kutta
//! scheme.
//!
//! ## Mathematical Model
//!
//! ### Nomenclature
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `V` | Liquid volume | m³ |
//! | `CA` | Reactant concentration | mol/m³ |
//! | `T` | Reactor temperature | K |
//! | `TJ` | Jacket temperature | K |
//! | `F0`, `CA0`, `T0` | Feed flow rate, concentration, temperature | m³/s, mol/m³, K |
//! | `TJ0`, `FJ` | Coolant inlet temperature and flow rate | K, m³/s |
//! | `KV`, `Vmin` | Outlet valve constant, minimum volume | 1/s, m³ |
//! | `α`, `E`, `R`, `n` | Pre-exponential factor, activation energy, gas constant, order | -, J/mol, J/(mol·K), - |
//! | `ρ`, `Cp` | Liquid density and heat capacity | kg/m³, J/(kg·K) |
//! | `λ` | Heat of reaction | J/mol |
//! | `U`, `AH` | Heat transfer coefficient and area | W/(m²·K), m² |
//! | `ρJ`, `CJ`, `VJ` | Coolant density, heat capacity and jacket volume | kg/m³, J/(kg·K), m³ |
//!
//! ### Model Assumptions
//!
//! - Perfect mixing in the vessel and in the jacket (lumped model)
//! - Constant liquid density and heat capacity
//! - Outlet flow driven by the liquid level: `F = KV·(V - Vmin)`, not clamped
//!
//! ### Governing Equations
//!
//! ```text
//! k = α·exp(-E/(R·T)),  r = k·CA^n
//! dV/dt  = F0 - F
//! dCA/dt = (F0·CA0 - F·CA - V·r)/V
//! dT/dt  = (ρCp·(F0·T0 - F·T) - λ·V·r - U·AH·(T - TJ))/(ρCp·V)
//! dTJ/dt = (FJ·ρJCJ·(TJ0 - TJ) + U·AH·(T - TJ))/(ρJCJ·VJ)
//! ```
//!
//! ## Numerical Solution
//!
//! The state vector `x = (V, CA, T, TJ)` is advanced with the classical RK4 scheme at a fixed
//! step `dt` (0.1 s by default). No input validation is performed by the integrator: degenerate
//! configurations (zero volume, negative concentration raised to a fractional order) propagate
//! as NaN/inf. An optional [`validation::StateValidator`] can be attached to the model to turn
//! such states into errors instead.
//!
//! ## Main Structures
//!
//! - **`ReactorModel`**: owns the state and parameter snapshot, steps, exposes diagnostics
//! - **`CSTRSimulation`**: caller-side driver with speed multiplier, history and postprocessing
//! - **`CSTRTask`**: JSON task file describing a complete run

#[allow(non_snake_case)]
pub mod CSTR;
#[allow(non_snake_case)]
pub mod CSTR_pretty_print;
#[allow(non_snake_case)]
pub mod CSTR_simulation;
#[allow(non_snake_case)]
mod CSTR_tests;
pub mod reactor_error;
pub mod rk4;
#[allow(non_snake_case)]
pub mod task_parser_CSTR;
pub mod validation;
