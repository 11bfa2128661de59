//! Welcome burst and registration completion.

use tinyircd_proto::Response;
use tracing::info;

use super::super::Context;

/// Complete registration if both NICK and USER have arrived.
///
/// Sends the welcome burst the one time the transition happens.
pub fn try_complete_registration(ctx: &Context<'_>) {
    if ctx.client.try_register() {
        send_welcome_burst(ctx);
    }
}

/// Send 001-004 and, if configured, the MOTD.
fn send_welcome_burst(ctx: &Context<'_>) {
    let server = &ctx.matrix.server_info;
    let (nick, mask, host) = {
        let state = ctx.client.state();
        (state.nick.clone(), state.mask(), state.host.clone())
    };

    ctx.reply(
        Response::RPL_WELCOME,
        &format!(":Welcome to the Internet Relay Network {mask}"),
    );
    ctx.reply(
        Response::RPL_YOURHOST,
        &format!(
            ":Your host is {}, running version {}",
            server.name, server.version
        ),
    );
    ctx.reply(
        Response::RPL_CREATED,
        &format!(
            ":This server was created {}",
            server.created.format("%a %b %e %Y at %H:%M:%S UTC")
        ),
    );
    ctx.reply(
        Response::RPL_MYINFO,
        &format!("{} {} iow imnpstbklov", server.name, server.version),
    );

    if let Some(motd) = &ctx.matrix.config.motd {
        ctx.reply(
            Response::RPL_MOTDSTART,
            &format!(":- {} Message of the day - ", server.name),
        );
        for line in motd.trim().lines() {
            ctx.reply(Response::RPL_MOTD, &format!(":- {line}"));
        }
        ctx.reply(Response::RPL_ENDOFMOTD, ":End of /MOTD command");
    }

    info!(client = ctx.client.id(), nick = %nick, host = %host, "Client registered");
}
