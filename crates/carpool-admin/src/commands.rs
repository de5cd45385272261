//! Subcommands and their execution against any [`CarpoolStore`].
//!
//! Every command yields a JSON value; `main` prints it.

use anyhow::{Context as _, anyhow};
use carpool_core::{
  carpool::NewCarpool,
  id::{CarpoolId, PersonId, RideRequestId},
  person::NewPerson,
  ride_request::{NewRideRequest, RideRequestStatus},
  store::CarpoolStore,
};
use clap::Subcommand;
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage people.
  #[command(subcommand)]
  Person(PersonCommand),

  /// Grant or revoke roles.
  #[command(subcommand)]
  Role(RoleCommand),

  /// Manage carpools.
  #[command(subcommand)]
  Carpool(CarpoolCommand),

  /// Manage ride requests.
  #[command(subcommand)]
  Request(RequestCommand),

  /// List a carpool's riders (approved requests by default).
  Riders {
    carpool: i64,
    /// Comma-separated statuses to match instead of `approved`.
    #[arg(long, value_delimiter = ',', conflicts_with = "potential")]
    status: Vec<RideRequestStatus>,
    /// Include people whose request is still pending.
    #[arg(long)]
    potential: bool,
  },

  /// Whether the given session identity drives this carpool.
  IsDriver {
    carpool: i64,
    #[arg(long = "as", value_name = "UUID")]
    identity: Option<Uuid>,
  },
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
  Add {
    social_id: String,
    email: String,
    #[arg(long)]
    gender: Option<String>,
    /// Free-text description used when gender is `Self-described`.
    #[arg(long)]
    gender_self_describe: Option<String>,
  },
  Show {
    #[arg(required_unless_present = "uuid")]
    id: Option<i64>,
    #[arg(long, conflicts_with = "id")]
    uuid: Option<Uuid>,
  },
  List,
}

#[derive(Subcommand, Debug)]
pub enum RoleCommand {
  Grant { person: i64, name: String },
  Revoke { person: i64, name: String },
}

#[derive(Subcommand, Debug)]
pub enum CarpoolCommand {
  Add {
    #[arg(long)]
    driver: Option<i64>,
  },
  Show {
    id: i64,
  },
  /// Replace the driver; omit `--driver` to clear it.
  SetDriver {
    id: i64,
    #[arg(long)]
    driver: Option<i64>,
  },
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
  Add {
    person: i64,
    carpool: i64,
    #[arg(long, default_value_t = RideRequestStatus::Requested)]
    status: RideRequestStatus,
  },
  SetStatus {
    id: i64,
    status: RideRequestStatus,
  },
  /// A carpool's ride requests in creation order.
  List {
    carpool: i64,
    #[arg(long, value_delimiter = ',')]
    status: Option<Vec<RideRequestStatus>>,
  },
  /// The ride request made by the given session identity.
  Current {
    carpool: i64,
    #[arg(long = "as", value_name = "UUID")]
    identity: Option<Uuid>,
  },
}

/// Execute `command` against `store`.
pub async fn run<S: CarpoolStore>(store: &S, command: Command) -> anyhow::Result<Value> {
  match command {
    Command::Person(cmd) => person(store, cmd).await,
    Command::Role(cmd) => role(store, cmd).await,
    Command::Carpool(cmd) => carpool(store, cmd).await,
    Command::Request(cmd) => request(store, cmd).await,

    Command::Riders { carpool, status, potential } => {
      let carpool = CarpoolId(carpool);
      let riders = if potential {
        store.riders_and_potential_riders(carpool).await?
      } else if status.is_empty() {
        store.riders(carpool).await?
      } else {
        store.get_riders(carpool, &status).await?
      };
      Ok(serde_json::to_value(riders)?)
    }

    Command::IsDriver { carpool, identity } => {
      let identity = store.identify(identity).await?;
      let carpool = store
        .get_carpool(CarpoolId(carpool))
        .await?
        .ok_or_else(|| anyhow!("carpool {carpool} not found"))?;
      Ok(json!({ "is_driver": carpool.current_user_is_driver(identity) }))
    }
  }
}

async fn person<S: CarpoolStore>(store: &S, cmd: PersonCommand) -> anyhow::Result<Value> {
  match cmd {
    PersonCommand::Add { social_id, email, gender, gender_self_describe } => {
      let person = store
        .add_person(NewPerson { social_id, email, gender, gender_self_describe })
        .await?;
      tracing::info!(person_id = %person.person_id, uuid = %person.get_id(), "person added");
      Ok(serde_json::to_value(person)?)
    }
    PersonCommand::Show { id, uuid } => {
      let person = match (id, uuid) {
        (_, Some(uuid)) => store.get_person_by_uuid(uuid).await?,
        (Some(id), None) => store.get_person(PersonId(id)).await?,
        (None, None) => None,
      }
      .context("person not found")?;
      let gender = person.gender_string();
      Ok(json!({ "person": person, "gender": gender }))
    }
    PersonCommand::List => Ok(serde_json::to_value(store.list_people().await?)?),
  }
}

async fn role<S: CarpoolStore>(store: &S, cmd: RoleCommand) -> anyhow::Result<Value> {
  match cmd {
    RoleCommand::Grant { person, name } => {
      let role = store.grant_role(PersonId(person), &name).await?;
      Ok(serde_json::to_value(role)?)
    }
    RoleCommand::Revoke { person, name } => {
      let removed = store.revoke_role(PersonId(person), &name).await?;
      Ok(json!({ "removed": removed }))
    }
  }
}

async fn carpool<S: CarpoolStore>(store: &S, cmd: CarpoolCommand) -> anyhow::Result<Value> {
  match cmd {
    CarpoolCommand::Add { driver } => {
      let carpool = store
        .add_carpool(NewCarpool { driver_id: driver.map(PersonId) })
        .await?;
      tracing::info!(carpool_id = %carpool.carpool_id, "carpool added");
      Ok(serde_json::to_value(carpool)?)
    }
    CarpoolCommand::Show { id } => {
      let carpool = store
        .get_carpool(CarpoolId(id))
        .await?
        .ok_or_else(|| anyhow!("carpool {id} not found"))?;
      Ok(serde_json::to_value(carpool)?)
    }
    CarpoolCommand::SetDriver { id, driver } => {
      let carpool = store
        .set_driver(CarpoolId(id), driver.map(PersonId))
        .await?;
      Ok(serde_json::to_value(carpool)?)
    }
  }
}

async fn request<S: CarpoolStore>(store: &S, cmd: RequestCommand) -> anyhow::Result<Value> {
  match cmd {
    RequestCommand::Add { person, carpool, status } => {
      let request = store
        .add_ride_request(
          NewRideRequest::new(PersonId(person), CarpoolId(carpool)).with_status(status),
        )
        .await?;
      Ok(serde_json::to_value(request)?)
    }
    RequestCommand::SetStatus { id, status } => {
      let request = store
        .set_ride_request_status(RideRequestId(id), status)
        .await?;
      tracing::info!(ride_request_id = id, %status, "ride request updated");
      Ok(serde_json::to_value(request)?)
    }
    RequestCommand::List { carpool, status } => {
      let requests = store
        .get_ride_requests(CarpoolId(carpool), status.as_deref())
        .await?;
      Ok(serde_json::to_value(requests)?)
    }
    RequestCommand::Current { carpool, identity } => {
      let identity = store.identify(identity).await?;
      let request = store
        .get_current_user_ride_request(CarpoolId(carpool), identity)
        .await?;
      Ok(serde_json::to_value(request)?)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use carpool_store_sqlite::SqliteStore;
  use clap::Parser;

  #[derive(Parser)]
  struct Harness {
    #[command(subcommand)]
    command: Command,
  }

  fn parse(args: &[&str]) -> Command {
    Harness::try_parse_from(std::iter::once("carpool-admin").chain(args.iter().copied()))
      .unwrap()
      .command
  }

  async fn exec(store: &SqliteStore, args: &[&str]) -> Value {
    run(store, parse(args)).await.unwrap()
  }

  #[tokio::test]
  async fn riders_flow() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let driver = exec(&store, &["person", "add", "d", "d@example.com"]).await;
    let rider = exec(&store, &["person", "add", "r", "r@example.com"]).await;
    let driver_id = driver["person_id"].to_string();
    let rider_id = rider["person_id"].to_string();

    let carpool = exec(&store, &["carpool", "add", "--driver", &driver_id]).await;
    let carpool_id = carpool["carpool_id"].to_string();

    exec(&store, &["request", "add", &rider_id, &carpool_id]).await;

    let riders = exec(&store, &["riders", &carpool_id]).await;
    assert_eq!(riders.as_array().unwrap().len(), 0);

    let potential = exec(&store, &["riders", &carpool_id, "--potential"]).await;
    assert_eq!(potential.as_array().unwrap().len(), 1);

    let pending =
      exec(&store, &["riders", &carpool_id, "--status", "requested,rejected"]).await;
    assert_eq!(pending[0]["person_id"], rider["person_id"]);
  }

  #[tokio::test]
  async fn identity_aware_commands() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let driver = exec(&store, &["person", "add", "d", "d@example.com"]).await;
    let driver_id = driver["person_id"].to_string();
    let driver_uuid = driver["uuid"].as_str().unwrap().to_owned();
    let carpool = exec(&store, &["carpool", "add", "--driver", &driver_id]).await;
    let carpool_id = carpool["carpool_id"].to_string();

    let anon = exec(&store, &["is-driver", &carpool_id]).await;
    assert_eq!(anon["is_driver"], false);

    let me = exec(&store, &["is-driver", &carpool_id, "--as", &driver_uuid]).await;
    assert_eq!(me["is_driver"], true);

    let current = exec(&store, &["request", "current", &carpool_id]).await;
    assert!(current.is_null());
  }

  #[tokio::test]
  async fn show_person_renders_gender() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let p = exec(
      &store,
      &[
        "person", "add", "s", "s@example.com",
        "--gender", "Self-described",
        "--gender-self-describe", "nonbinary",
      ],
    )
    .await;

    let shown = exec(&store, &["person", "show", &p["person_id"].to_string()]).await;
    assert_eq!(shown["gender"], "Self-described as nonbinary");
  }

  #[test]
  fn unknown_status_is_rejected_by_parser() {
    let parsed = Harness::try_parse_from(["carpool-admin", "request", "set-status", "1", "maybe"]);
    assert!(parsed.is_err());
  }
}
