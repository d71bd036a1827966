//! Process exit codes of the `rds-bootstrap` binary.
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | success                                   |
//! | 1    | unexpected internal error                 |
//! | 2    | invalid configuration                     |
//! | 10   | parameter lookup failed                   |
//! | 11   | parameter decryption failed               |
//! | 20   | could not connect to the database         |
//! | 21   | CREATE DATABASE failed                    |
//! | 22   | CREATE USER failed                        |
//! | 23   | GRANT failed                              |

use mysql_provisioner::ProvisioningStep;

pub const SUCCESS: i32 = 0;
pub const INTERNAL: i32 = 1;
pub const CONFIG: i32 = 2;
pub const LOOKUP_FAILURE: i32 = 10;
pub const DECRYPT_FAILURE: i32 = 11;
pub const CONNECT_FAILURE: i32 = 20;
pub const CREATE_DATABASE_FAILURE: i32 = 21;
pub const CREATE_USER_FAILURE: i32 = 22;
pub const GRANT_FAILURE: i32 = 23;

pub fn for_step(step: ProvisioningStep) -> i32 {
    match step {
        ProvisioningStep::Connect => CONNECT_FAILURE,
        ProvisioningStep::CreateDatabase => CREATE_DATABASE_FAILURE,
        ProvisioningStep::CreateUser => CREATE_USER_FAILURE,
        ProvisioningStep::GrantPrivileges => GRANT_FAILURE,
    }
}
