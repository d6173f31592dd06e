use drawer_core::{ActionId, DeviceClass};

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Render,
    Click(ActionId),
    /// Resolve the pending confirmation for this action, or the only one.
    Accept(Option<ActionId>),
    Cancel(Option<ActionId>),
    Submit { url: String, key: String },
    Close,
    Join,
    Leave,
    Device(DeviceClass),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  render                      show the drawer for the current session
  invite | participants | record | live | settings
                              click an action
  accept | cancel [record|live]
                              resolve a pending confirmation
  submit <rtmp-url> <key>     submit the go-live form
  close                       close the drawer
  join | leave                change the participant count
  device <mobile|mobile-small|tablet|desktop>
  quit";

pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".into());
    };
    let command = match head {
        "render" => Command::Render,
        "invite" => Command::Click(ActionId::Invite),
        "participants" => Command::Click(ActionId::Participants),
        "record" => Command::Click(ActionId::Record),
        "live" => Command::Click(ActionId::LiveStream),
        "settings" => Command::Click(ActionId::Settings),
        "accept" => Command::Accept(words.next().map(parse_confirmable).transpose()?),
        "cancel" => Command::Cancel(words.next().map(parse_confirmable).transpose()?),
        "submit" => {
            let (Some(url), Some(key)) = (words.next(), words.next()) else {
                return Err("usage: submit <rtmp-url> <key>".into());
            };
            Command::Submit {
                url: url.to_string(),
                key: key.to_string(),
            }
        }
        "close" => Command::Close,
        "join" => Command::Join,
        "leave" => Command::Leave,
        "device" => Command::Device(parse_device(words.next().unwrap_or_default())?),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    if words.next().is_some() {
        return Err(format!("too many arguments for '{head}'"));
    }
    Ok(command)
}

fn parse_confirmable(name: &str) -> Result<ActionId, String> {
    match name {
        "record" => Ok(ActionId::Record),
        "live" => Ok(ActionId::LiveStream),
        other => Err(format!("'{other}' has no confirmation")),
    }
}

fn parse_device(name: &str) -> Result<DeviceClass, String> {
    match name {
        "mobile" => Ok(DeviceClass::Mobile),
        "mobile-small" => Ok(DeviceClass::MobileSmall),
        "tablet" => Ok(DeviceClass::Tablet),
        "desktop" => Ok(DeviceClass::Desktop),
        other => Err(format!("unknown device class '{other}'")),
    }
}
